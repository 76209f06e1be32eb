//! HTTP mapping for `MetrixError`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use metrix_core::MetrixError;

/// Handler-boundary error: every failure ends here as a status code and a
/// plain-text body.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub MetrixError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MetrixError::MissingName | MetrixError::NotFound(_) => StatusCode::NOT_FOUND,
            MetrixError::InvalidKind(_)
            | MetrixError::InvalidValue { .. }
            | MetrixError::Encoding(_)
            | MetrixError::Config(_) => StatusCode::BAD_REQUEST,
            MetrixError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            MetrixError::Storage(_) | MetrixError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_server_fault() {
            tracing::error!(class = self.0.class().as_str(), error = %self.0, "request failed");
        } else {
            tracing::debug!(class = self.0.class().as_str(), error = %self.0, "request rejected");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.to_string(),
        )
            .into_response()
    }
}
