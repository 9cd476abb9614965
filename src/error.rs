use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document already exists")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] mongodb::error::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User already exists")]
    DuplicateUser,
    // Unknown email and wrong password share this variant.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid product ID format")]
    InvalidId,
    #[error("Product not found")]
    NotFound,
    #[error("Invalid request: {0}")]
    MalformedBody(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Logs the underlying cause and collapses it to a 500.
    pub fn internal(context: &str, cause: impl std::fmt::Display) -> Self {
        error!("{context}: {cause}");
        ApiError::Internal
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => ApiError::DuplicateUser,
            StoreError::Backend(e) => ApiError::internal("Database error", e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUser | ApiError::InvalidId | ApiError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.to_string(),
        }))
    }
}
