use crate::domain::error::DomainError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unauthorized")]
    Unauthorized,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
    pub(crate) code: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                DomainError::UserNotFound | DomainError::AuthorNotFound(_) => {
                    StatusCode::UNAUTHORIZED
                }
                DomainError::PostNotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Forbidden => StatusCode::FORBIDDEN,
                DomainError::CreationFailed(_)
                | DomainError::DeleteFailed(_)
                | DomainError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Domain(err) => {
                // storage details stay in the logs
                let msg = match &err {
                    DomainError::Unexpected(_) => "internal error".to_string(),
                    _ => err.to_string(),
                };
                ErrorBody {
                    error: msg,
                    code: err.code().to_string(),
                }
            }
            AppError::Validation(err) => ErrorBody {
                error: err.to_string(),
                code: "VALIDATION_FAILED".to_string(),
            },
            AppError::Unauthorized => ErrorBody {
                error: "unauthorized".to_string(),
                code: "UNAUTHENTICATED".to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
