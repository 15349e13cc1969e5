use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_repository::{AuthorFields, NewPost, PostQuery, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{
    AuthorSummary, CommentDetail, CommentSummary, LikeSummary, Post, PostDetail, PostView,
};

#[derive(Debug, Clone)]
struct StoredAuthor {
    id: i64,
    username: String,
    name: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredComment {
    id: i64,
    post_id: i64,
    user_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredLike {
    id: i64,
    post_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    authors: Vec<StoredAuthor>,
    posts: Vec<Post>,
    comments: Vec<StoredComment>,
    likes: Vec<StoredLike>,
    last_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn author(&self, id: i64) -> Option<&StoredAuthor> {
        self.authors.iter().find(|author| author.id == id)
    }

    fn author_summary(&self, id: i64, fields: AuthorFields) -> Result<AuthorSummary, DomainError> {
        let author = self
            .author(id)
            .ok_or_else(|| DomainError::Unexpected(format!("dangling author reference: {id}")))?;
        Ok(AuthorSummary {
            id: author.id,
            username: author.username.clone(),
            name: match fields {
                AuthorFields::Minimal => None,
                AuthorFields::WithName => author.name.clone(),
            },
        })
    }

    /// Comments of `post_id`, newest first.
    fn comments_of(&self, post_id: i64) -> Vec<&StoredComment> {
        let mut comments: Vec<&StoredComment> = self
            .comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        comments
    }
}

/// Store kept behind a mutex; stands in for Postgres in tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryPostRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryPostRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().expect("store mutex poisoned")
    }

    pub(crate) fn add_author(&self, username: &str, name: Option<&str>) -> i64 {
        let mut store = self.lock();
        let id = store.next_id();
        store.authors.push(StoredAuthor {
            id,
            username: username.to_string(),
            name: name.map(str::to_string),
        });
        id
    }

    pub(crate) fn add_post_at(
        &self,
        author_id: i64,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Post {
        let mut store = self.lock();
        let id = store.next_id();
        let post = Post::new(id, title, format!("{title} body"), author_id, created_at)
            .expect("seeded post must be valid");
        store.posts.push(post.clone());
        post
    }

    pub(crate) fn add_comment_at(
        &self,
        post_id: i64,
        user_id: i64,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        let mut store = self.lock();
        let id = store.next_id();
        store.comments.push(StoredComment {
            id,
            post_id,
            user_id,
            content: content.to_string(),
            created_at,
        });
        id
    }

    pub(crate) fn add_like(&self, post_id: i64, user_id: i64) -> i64 {
        let mut store = self.lock();
        let id = store.next_id();
        store.likes.push(StoredLike {
            id,
            post_id,
            user_id,
            created_at: Utc::now(),
        });
        id
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    pub(crate) fn contains_post(&self, id: i64) -> bool {
        self.lock().posts.iter().any(|post| post.id == id)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut store = self.lock();
        if store.author(input.author_id).is_none() {
            return Err(DomainError::AuthorNotFound(input.author_id));
        }

        let id = store.next_id();
        let post = Post::new(id, input.title, input.content, input.author_id, Utc::now())?;
        store.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.iter().find(|post| post.id == id).cloned())
    }

    async fn find_posts(&self, query: PostQuery) -> Result<Vec<PostView>, DomainError> {
        let store = self.lock();
        let mut posts: Vec<&Post> = store
            .posts
            .iter()
            .filter(|post| {
                query
                    .filter
                    .author_id
                    .is_none_or(|author_id| post.author_id == author_id)
            })
            .filter(|post| {
                query
                    .filter
                    .created_within
                    .is_none_or(|window| window.contains(post.created_at))
            })
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let skip = usize::try_from(query.pagination.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(query.pagination.take()).unwrap_or(usize::MAX);

        posts
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|post| -> Result<PostView, DomainError> {
                let author = store.author_summary(post.author_id, query.include.author)?;
                let comments = query.include.comments.then(|| {
                    store
                        .comments_of(post.id)
                        .into_iter()
                        .map(|comment| CommentSummary {
                            id: comment.id,
                            content: comment.content.clone(),
                            created_at: comment.created_at,
                        })
                        .collect::<Vec<_>>()
                });
                let likes = query.include.likes.then(|| {
                    store
                        .likes
                        .iter()
                        .filter(|like| like.post_id == post.id)
                        .map(|like| LikeSummary {
                            id: like.id,
                            user_id: like.user_id,
                            created_at: like.created_at,
                        })
                        .collect::<Vec<_>>()
                });

                Ok(PostView {
                    post: post.clone(),
                    author,
                    comments,
                    likes,
                })
            })
            .collect()
    }

    async fn get_post_detail(&self, id: i64) -> Result<Option<PostDetail>, DomainError> {
        let store = self.lock();
        let Some(post) = store.posts.iter().find(|post| post.id == id) else {
            return Ok(None);
        };

        let author = store.author_summary(post.author_id, AuthorFields::Minimal)?;
        let comments = store
            .comments_of(post.id)
            .into_iter()
            .map(|comment| CommentDetail {
                id: comment.id,
                content: comment.content.clone(),
                created_at: comment.created_at,
                username: store
                    .author(comment.user_id)
                    .map(|author| author.username.clone()),
                post: Some(post.summary()),
            })
            .collect();

        Ok(Some(PostDetail {
            post: post.clone(),
            author,
            comments,
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut store = self.lock();
        let before = store.posts.len();
        store.posts.retain(|post| post.id != id);
        let deleted = store.posts.len() < before;
        if deleted {
            store.comments.retain(|comment| comment.post_id != id);
            store.likes.retain(|like| like.post_id != id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::InMemoryPostRepository;
    use crate::data::post_repository::{
        AuthorFields, NewPost, Pagination, PostFilter, PostInclude, PostQuery, PostRepository,
    };
    use crate::domain::error::DomainError;

    #[tokio::test]
    async fn create_post_requires_existing_author() {
        let repo = InMemoryPostRepository::new();

        let err = repo
            .create_post(NewPost {
                title: "title".to_string(),
                content: "content".to_string(),
                author_id: 99,
            })
            .await
            .expect_err("author is missing");
        assert!(matches!(err, DomainError::AuthorNotFound(99)));
        assert_eq!(repo.post_count(), 0);
    }

    #[tokio::test]
    async fn find_posts_orders_newest_first_and_projects_author() {
        let repo = InMemoryPostRepository::new();
        let author = repo.add_author("alice", Some("Alice"));
        let now = Utc::now();
        let older = repo.add_post_at(author, "older", now - Duration::hours(1));
        let newer = repo.add_post_at(author, "newer", now);

        let query = PostQuery {
            filter: PostFilter::default(),
            pagination: Pagination::new(1, 10),
            include: PostInclude::author_only(AuthorFields::Minimal),
        };
        let views = repo.find_posts(query).await.expect("find must succeed");

        let ids: Vec<i64> = views.iter().map(|view| view.post.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(views[0].author.username, "alice");
        assert_eq!(views[0].author.name, None);
        assert!(views[0].comments.is_none());
        assert!(views[0].likes.is_none());
    }

    #[tokio::test]
    async fn delete_post_cascades_to_children() {
        let repo = InMemoryPostRepository::new();
        let author = repo.add_author("alice", None);
        let post = repo.add_post_at(author, "title", Utc::now());
        repo.add_comment_at(post.id, author, "hi", Utc::now());
        repo.add_like(post.id, author);

        let deleted = repo.delete_post(post.id).await.expect("delete must succeed");
        assert!(deleted);
        let deleted_again = repo.delete_post(post.id).await.expect("delete must succeed");
        assert!(!deleted_again);
        assert!(repo.lock().comments.is_empty());
        assert!(repo.lock().likes.is_empty());
    }
}
