use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthenticatedUser>().cloned())
    }
}

/// Rejects requests without a valid bearer token.
pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?.ok_or(AppError::Unauthorized)?;
    let user = authenticate(&state, token)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Lets anonymous requests through, but a token that is present must be valid.
pub(crate) async fn optional_jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(request.headers())? {
        let user = authenticate(&state, token)?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_header = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next().ok_or(AppError::Unauthorized)?;
    let token = parts.next().ok_or(AppError::Unauthorized)?;
    if parts.next().is_some() {
        return Err(AppError::Unauthorized);
    }
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized);
    }
    if token.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(Some(token.trim().to_string()))
}

fn authenticate(state: &AppState, token: String) -> Result<AuthenticatedUser, AppError> {
    let claims = state
        .jwt
        .verify_token(&token)
        .map_err(|err| {
            debug!(error = %err, "rejected access token");
            AppError::Unauthorized
        })?;
    debug!(user_id = claims.user_id, username = %claims.username, "request authenticated");

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
    })
}
