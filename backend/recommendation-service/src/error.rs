use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::{ErrorResponse, UserId};

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures raised while resolving a recommendation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoError {
    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("Model {0} not found")]
    ModelNotFound(String),
}

/// Failures while reading model artifacts at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Raw id as requested; may be wider than `UserId`.
    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Model {0} not found")]
    ModelNotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        loc: Option<serde_json::Value>,
    },

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn error_key(&self) -> &'static str {
        match self {
            AppError::UserNotFound(_) => "user_not_found",
            AppError::ModelNotFound(_) => "model_not_found",
            AppError::Validation { .. } => "validation_error",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            loc: None,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (error_message, error_loc) = match self {
            AppError::Validation { message, loc } => (message.clone(), loc.clone()),
            AppError::Unauthorized(msg) | AppError::Internal(msg) => (msg.clone(), None),
            other => (other.to_string(), None),
        };

        ErrorResponse {
            error_key: self.error_key().to_string(),
            error_message,
            error_loc,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(self.body())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UserNotFound(_) | AppError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecoError> for AppError {
    fn from(err: RecoError) -> Self {
        match err {
            RecoError::UserNotFound(user_id) => AppError::UserNotFound(user_id.to_string()),
            RecoError::ModelNotFound(name) => AppError::ModelNotFound(name),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
