use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, posts_from_yesterday, top_posts_today,
};
use crate::presentation::http::middleware::auth::{
    jwt_auth_middleware, optional_jwt_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/today", get(top_posts_today))
        .route("/api/posts/yesterday", get(posts_from_yesterday))
        .route("/api/posts/{id}", get(get_post));

    // anonymous callers reach the handler and get USER_NOT_FOUND
    let create = Router::new()
        .route("/api/posts", post(create_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_jwt_auth_middleware,
        ));

    let protected = Router::new()
        .route("/api/posts/{id}", delete(delete_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(create).merge(protected)
}
