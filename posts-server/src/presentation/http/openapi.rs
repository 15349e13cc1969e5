use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::ErrorBody;
use crate::presentation::http::handlers::posts::{
    AuthorDto, CommentDetailDto, CommentDto, CreatePostDto, LikeDto, ListPostsResponseDto,
    PaginationQuery, PostDetailDto, PostDto, PostSummaryDto, PostWithRelationsDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::list_user_posts,
        crate::presentation::http::handlers::posts::top_posts_today,
        crate::presentation::http::handlers::posts::posts_from_yesterday,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::delete_post
    ),
    components(
        schemas(
            CreatePostDto,
            PaginationQuery,
            PostDto,
            AuthorDto,
            CommentDto,
            LikeDto,
            PostSummaryDto,
            CommentDetailDto,
            PostWithRelationsDto,
            PostDetailDto,
            ListPostsResponseDto,
            ErrorBody
        )
    ),
    tags(
        (name = "posts", description = "Post endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
