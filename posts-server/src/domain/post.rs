use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("author_id", author_id)?;
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            title,
            content,
            author_id,
            created_at,
        })
    }

    pub(crate) fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

/// Author projection embedded into post results. `name` is only loaded
/// when the query asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthorSummary {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentSummary {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LikeSummary {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostSummary {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentDetail {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) username: Option<String>,
    pub(crate) post: Option<PostSummary>,
}

/// A post row plus whatever relations the query included.
/// `comments`/`likes` are `None` when they were not requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostView {
    pub(crate) post: Post,
    pub(crate) author: AuthorSummary,
    pub(crate) comments: Option<Vec<CommentSummary>>,
    pub(crate) likes: Option<Vec<LikeSummary>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) author: AuthorSummary,
    pub(crate) comments: Vec<CommentDetail>,
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{CreatePostRequest, DomainError, Post};

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            content: "valid content".to_string(),
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_rejects_empty_content() {
        let req = CreatePostRequest {
            title: "valid title".to_string(),
            content: "  \n ".to_string(),
        };

        let err = req.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn create_post_request_validate_rejects_long_title() {
        let req = CreatePostRequest {
            title: "x".repeat(256),
            content: "content".to_string(),
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.content, "content");
    }

    #[test]
    fn post_new_normalizes_and_builds_post() {
        let post = Post::new(1, "  Title  ", "  Content  ", 10, Utc::now())
            .expect("post should be created");

        assert_eq!(post.id, 1);
        assert_eq!(post.author_id, 10);
        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "Content");
    }

    #[test]
    fn post_new_rejects_non_positive_author_id() {
        let err =
            Post::new(1, "Title", "Content", 0, Utc::now()).expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn summary_copies_post_fields() {
        let post = Post::new(4, "Title", "Content", 2, Utc::now()).expect("valid post");
        let summary = post.summary();

        assert_eq!(summary.id, 4);
        assert_eq!(summary.title, "Title");
        assert_eq!(summary.content, "Content");
        assert_eq!(summary.created_at, post.created_at);
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
