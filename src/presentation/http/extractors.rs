//! Custom Extractors
//!
//! Axum extractors for authentication and request parsing.

use axum::{extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{headers::Cookie, TypedHeader};

use crate::domain::AuthenticatedSession;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Session resolved from the session cookie
#[derive(Debug, Clone)]
pub struct SessionUser(pub AuthenticatedSession);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(cookies) = parts
            .extract::<TypedHeader<Cookie>>()
            .await
            .map_err(|_| AppError::Unauthorized("Missing session cookie".into()))?;

        let token = cookies
            .get(&state.settings.session.cookie_name)
            .ok_or_else(|| AppError::Unauthorized("Missing session cookie".into()))?;

        let session = state.sessions.resolve(token).await?;
        Ok(SessionUser(session))
    }
}
