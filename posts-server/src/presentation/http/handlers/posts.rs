use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::post_service::PostPage;
use crate::domain::error::DomainError;
use crate::domain::post::{
    AuthorSummary, CommentDetail, CommentSummary, CreatePostRequest, LikeSummary, Post,
    PostDetail, PostSummary, PostView,
};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PaginationQuery {
    /// Page number, starting at 1
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    /// Items per page (1..=100)
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
}

impl PaginationQuery {
    fn page_and_limit(&self) -> (u32, u32) {
        (
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostSummaryDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDetailDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) username: Option<String>,
    pub(crate) post: Option<PostSummaryDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostWithRelationsDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) author: AuthorDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comments: Option<Vec<CommentDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) likes: Option<Vec<LikeDto>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) author: AuthorDto,
    pub(crate) comments: Vec<CommentDetailDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostWithRelationsDto>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            created_at: post.created_at,
        }
    }
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id,
            username: author.username,
            name: author.name,
        }
    }
}

impl From<CommentSummary> for CommentDto {
    fn from(comment: CommentSummary) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

impl From<LikeSummary> for LikeDto {
    fn from(like: LikeSummary) -> Self {
        Self {
            id: like.id,
            user_id: like.user_id,
            created_at: like.created_at,
        }
    }
}

impl From<PostSummary> for PostSummaryDto {
    fn from(summary: PostSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            content: summary.content,
            created_at: summary.created_at,
        }
    }
}

impl From<CommentDetail> for CommentDetailDto {
    fn from(comment: CommentDetail) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            username: comment.username,
            post: comment.post.map(PostSummaryDto::from),
        }
    }
}

impl From<PostView> for PostWithRelationsDto {
    fn from(view: PostView) -> Self {
        Self {
            post: view.post.into(),
            author: view.author.into(),
            comments: view
                .comments
                .map(|comments| comments.into_iter().map(CommentDto::from).collect()),
            likes: view
                .likes
                .map(|likes| likes.into_iter().map(LikeDto::from).collect()),
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            author: detail.author.into(),
            comments: detail
                .comments
                .into_iter()
                .map(CommentDetailDto::from)
                .collect(),
        }
    }
}

impl From<PostPage> for ListPostsResponseDto {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page
                .posts
                .into_iter()
                .map(PostWithRelationsDto::from)
                .collect(),
            page: page.page,
            limit: page.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, limit) = query.page_and_limit();

    let result = state.post_service.list_posts(page, limit).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/posts",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Author id"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Posts of the user listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, limit) = query.page_and_limit();

    let result = state
        .post_service
        .list_user_posts(user_id, page, limit)
        .await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/today",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Posts created today", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn top_posts_today(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, limit) = query.page_and_limit();

    let result = state.post_service.top_posts_today(page, limit).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/yesterday",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Posts created yesterday", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn posts_from_yesterday(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, limit) = query.page_and_limit();

    let result = state.post_service.posts_from_yesterday(page, limit).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let result = state.post_service.get_post(id).await?;

    Ok((StatusCode::OK, Json(PostDetailDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Caller is not signed in"),
        (status = 500, description = "Post creation failed")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let Some(user) = auth else {
        return Err(DomainError::UserNotFound.into());
    };
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
    };

    let result = state
        .post_service
        .create_post(Some(user.user_id), req)
        .await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Post belongs to another user"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Delete failed")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
