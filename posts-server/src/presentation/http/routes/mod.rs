use axum::Router;

use crate::presentation::AppState;

pub(crate) mod posts;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(posts::router(state))
        .merge(users::router())
}
