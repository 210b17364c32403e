pub mod health;
pub mod models;
pub mod reco;

// Re-export handlers for convenience
pub use health::health_check;
pub use models::list_models;
pub use reco::{get_reco, RecoHandlerState, RecoQuery};

use actix_web::web;

use crate::error::AppError;

/// Path extraction errors rendered as structured validation errors.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation {
            message: err.to_string(),
            loc: Some(serde_json::json!(["path"])),
        }
        .into()
    })
}

/// Query extraction errors rendered as structured validation errors.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation {
            message: err.to_string(),
            loc: Some(serde_json::json!(["query"])),
        }
        .into()
    })
}
