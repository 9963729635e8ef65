/// Error types for Upload Service
///
/// Only input-validation and storage failures on the synchronous upload path
/// ever reach a client. Downstream and transcode failures are logged where
/// they happen and dropped; `Downstream` is surfaced solely by the catalog
/// listing proxy.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

/// Result type for upload-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed multipart body or missing video field
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },

    /// Writing the raw file failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Downstream error: {0}")]
    Downstream(#[from] DownstreamError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure of a call to the catalog or search collaborator
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable body: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Downstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_type, message) = match self {
            AppError::InvalidRequest(msg) => ("INVALID_REQUEST", msg.clone()),
            AppError::PayloadTooLarge { .. } => ("PAYLOAD_TOO_LARGE", self.to_string()),
            // Keep filesystem and downstream details in the logs only
            AppError::Storage(_) => ("STORAGE_ERROR", "Failed to save video".to_string()),
            AppError::Downstream(_) => {
                ("DOWNSTREAM_ERROR", "Failed to retrieve videos".to_string())
            }
            AppError::Internal(_) => ("INTERNAL_ERROR", "Internal server error".to_string()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_type.to_string(),
            message,
        })
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::InvalidRequest(format!("Multipart error: {}", err))
    }
}
