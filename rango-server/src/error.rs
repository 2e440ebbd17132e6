/// HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::metrics::ERRORS_TOTAL;

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Directory(#[from] rango_core::Error),

    #[error("Rate limit exceeded")]
    RateLimited,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Directory(err) => err.code(),
            AppError::RateLimited => "RATE_LIMITED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Directory(rango_core::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Directory(rango_core::Error::AlreadyExists(_)) => StatusCode::CONFLICT,
            AppError::Directory(rango_core::Error::InvalidArgument(_))
            | AppError::Directory(rango_core::Error::InvalidSlug(_)) => StatusCode::BAD_REQUEST,
            AppError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        ERRORS_TOTAL.with_label_values(&[code]).inc();

        match &self {
            AppError::Directory(err) if err.is_client_error() => {
                debug!("Rejected request: {}", err)
            }
            _ if status.is_server_error() => error!("Request failed: {}", self),
            _ => {}
        }

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = AppError::from(rango_core::Error::NotFound("category 1".into()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "NOT_FOUND");

        let duplicate = AppError::from(rango_core::Error::AlreadyExists("Python".into()));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let invalid = AppError::from(rango_core::Error::InvalidArgument("empty".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let corrupt = AppError::from(rango_core::Error::Corruption("bad".into()));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
