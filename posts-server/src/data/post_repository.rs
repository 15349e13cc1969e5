use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::calendar::DayWindow;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDetail, PostView};

pub(crate) const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub(crate) fn skip(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub(crate) fn take(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthorFields {
    /// id and username
    Minimal,
    /// id, username and display name
    WithName,
}

/// Relations to load alongside each post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostInclude {
    pub(crate) author: AuthorFields,
    pub(crate) comments: bool,
    pub(crate) likes: bool,
}

impl PostInclude {
    pub(crate) fn author_only(author: AuthorFields) -> Self {
        Self {
            author,
            comments: false,
            likes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) author_id: Option<i64>,
    pub(crate) created_within: Option<DayWindow>,
}

/// Posts are always returned newest first (`created_at DESC, id DESC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostQuery {
    pub(crate) filter: PostFilter,
    pub(crate) pagination: Pagination,
    pub(crate) include: PostInclude,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn find_posts(&self, query: PostQuery) -> Result<Vec<PostView>, DomainError>;
    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
}

pub(crate) type DynPostRepository = Arc<dyn PostRepository>;

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn find_posts(&self, query: PostQuery) -> Result<Vec<PostView>, DomainError> {
        (**self).find_posts(query).await
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        (**self).get_post_detail(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::{MAX_PAGE_SIZE, Pagination};

    #[test]
    fn first_page_starts_at_zero() {
        let pagination = Pagination::new(1, 10);
        assert_eq!(pagination.skip(), 0);
        assert_eq!(pagination.take(), 10);
    }

    #[test]
    fn later_pages_skip_previous_ones() {
        let pagination = Pagination::new(3, 25);
        assert_eq!(pagination.skip(), 50);
        assert_eq!(pagination.take(), 25);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let pagination = Pagination::new(0, 0);
        assert_eq!(
            pagination,
            Pagination {
                page: 1,
                page_size: 1
            }
        );

        let pagination = Pagination::new(2, 10_000);
        assert_eq!(pagination.page_size, MAX_PAGE_SIZE);
        assert_eq!(pagination.skip(), i64::from(MAX_PAGE_SIZE));
    }
}
