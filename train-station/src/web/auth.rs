//! Caller extraction.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::routes::AppError;
use super::state::AppState;
use crate::identity::Caller;

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AppError::Unauthorized {
                message: "malformed Authorization header".to_string(),
            })?),
            None => None,
        };

        Ok(state.auth.caller(header).await?)
    }
}
