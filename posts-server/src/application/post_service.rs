use tracing::{error, info, warn};

use crate::data::post_repository::{
    AuthorFields, NewPost, Pagination, PostFilter, PostInclude, PostQuery, PostRepository,
};
use crate::domain::calendar::{Calendar, DayWindow};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostDetail, PostView};

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) posts: Vec<PostView>,
    pub(crate) page: u32,
    pub(crate) limit: u32,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
    calendar: Calendar,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R, calendar: Calendar) -> Self {
        Self { repo, calendar }
    }

    /// `author_id` is the caller's identity as resolved by the transport;
    /// `None` means nobody is signed in and storage is never touched.
    pub(crate) async fn create_post(
        &self,
        author_id: Option<i64>,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let Some(author_id) = author_id else {
            return Err(DomainError::UserNotFound);
        };
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            author_id,
        };
        match self.repo.create_post(new_post).await {
            Ok(post) => {
                info!(post_id = post.id, author_id, "post created");
                Ok(post)
            }
            Err(err) => {
                error!(operation = "create_post", author_id, error = %err, "failed to create post");
                Err(DomainError::CreationFailed(err.to_string()))
            }
        }
    }

    pub(crate) async fn list_posts(&self, page: u32, limit: u32) -> Result<PostPage, DomainError> {
        let include = PostInclude {
            author: AuthorFields::WithName,
            comments: true,
            likes: true,
        };
        self.find_page("list_posts", PostFilter::default(), include, page, limit).await
    }

    pub(crate) async fn list_user_posts(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, DomainError> {
        let filter = PostFilter {
            author_id: Some(user_id),
            ..PostFilter::default()
        };
        let include = PostInclude::author_only(AuthorFields::Minimal);
        self.find_page("list_user_posts", filter, include, page, limit).await
    }

    pub(crate) async fn top_posts_today(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, DomainError> {
        let window = self.calendar.today();
        self.find_day_page("top_posts_today", window, page, limit).await
    }

    pub(crate) async fn posts_from_yesterday(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, DomainError> {
        let window = self.calendar.yesterday();
        self.find_day_page("posts_from_yesterday", window, page, limit).await
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<PostDetail, DomainError> {
        match self.repo.get_post_detail(id).await {
            Ok(Some(detail)) => Ok(detail),
            Ok(None) => Err(DomainError::PostNotFound(id)),
            Err(err) => {
                error!(operation = "get_post", post_id = id, error = %err, "failed to fetch post");
                Err(DomainError::Unexpected(err.to_string()))
            }
        }
    }

    /// Ownership is checked before anything is removed.
    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let original_post = self
            .repo
            .get_post(post_id)
            .await
            .map_err(|err| delete_failed(post_id, actor_user_id, err))?
            .ok_or(DomainError::PostNotFound(post_id))?;

        if original_post.author_id != actor_user_id {
            warn!(post_id, actor_user_id, "refused to delete post owned by another user");
            return Err(DomainError::Forbidden);
        }

        let deleted = self
            .repo
            .delete_post(post_id)
            .await
            .map_err(|err| delete_failed(post_id, actor_user_id, err))?;
        if !deleted {
            return Err(DomainError::PostNotFound(post_id));
        }

        info!(post_id, actor_user_id, "post deleted");
        Ok(())
    }

    async fn find_day_page(
        &self,
        operation: &'static str,
        window: DayWindow,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, DomainError> {
        let filter = PostFilter {
            created_within: Some(window),
            ..PostFilter::default()
        };
        let include = PostInclude::author_only(AuthorFields::WithName);
        self.find_page(operation, filter, include, page, limit).await
    }

    async fn find_page(
        &self,
        operation: &'static str,
        filter: PostFilter,
        include: PostInclude,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, DomainError> {
        let pagination = Pagination::new(page, limit);
        let query = PostQuery {
            filter,
            pagination,
            include,
        };

        let posts = self.repo.find_posts(query).await.map_err(|err| {
            error!(
                operation,
                page = pagination.page,
                limit = pagination.page_size,
                author_id = ?filter.author_id,
                error = %err,
                "failed to fetch posts"
            );
            DomainError::Unexpected(err.to_string())
        })?;

        Ok(PostPage {
            posts,
            page: pagination.page,
            limit: pagination.page_size,
        })
    }
}

fn delete_failed(post_id: i64, actor_user_id: i64, err: DomainError) -> DomainError {
    error!(
        operation = "delete_post",
        post_id,
        actor_user_id,
        error = %err,
        "failed to delete post"
    );
    DomainError::DeleteFailed(err.to_string())
}
