pub mod artifacts;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::Config;
pub use crate::error::{AppError, RecoError};
pub use crate::services::{ModelRegistry, RecoEngine};

use actix_web::web;
use std::sync::Arc;

use handlers::RecoHandlerState;
use middleware::{JwtAuth, JwtVerifier};

/// Register routes, extractor configs and shared state on an actix app.
///
/// `/health` and `/models` are public; `/reco` sits behind the JWT check
/// when a verifier is given.
pub fn configure(
    cfg: &mut web::ServiceConfig,
    state: web::Data<RecoHandlerState>,
    verifier: Option<Arc<JwtVerifier>>,
) {
    cfg.app_data(state)
        .app_data(handlers::path_config())
        .app_data(handlers::query_config())
        .service(handlers::health_check)
        .service(handlers::list_models)
        .service(
            web::scope("/reco")
                .wrap(JwtAuth::new(verifier))
                .service(handlers::get_reco),
        );
}
