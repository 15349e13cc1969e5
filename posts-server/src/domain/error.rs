use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("user not found")]
    UserNotFound,

    #[error("author not found: {0}")]
    AuthorNotFound(i64),

    #[error("post not found: {0}")]
    PostNotFound(i64),

    #[error("forbidden")]
    Forbidden,

    #[error("post creation failed")]
    CreationFailed(String),

    #[error("post deletion failed")]
    DeleteFailed(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}

impl DomainError {
    /// Stable status code exposed to callers.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_FAILED",
            DomainError::UserNotFound | DomainError::AuthorNotFound(_) => "USER_NOT_FOUND",
            DomainError::PostNotFound(_) => "POST_NOT_FOUND",
            DomainError::Forbidden => "UNAUTHORIZED",
            DomainError::CreationFailed(_) => "POST_CREATION_FAILED",
            DomainError::DeleteFailed(_) => "DELETE_FAILED",
            DomainError::Unexpected(_) => "UNKNOWN",
        }
    }
}
