/// Recommendation API handlers
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{RecoResponse, UserId};
use crate::services::RecoEngine;

/// Query parameters for GET /reco/{model_name}/{user_id}
#[derive(Debug, Deserialize)]
pub struct RecoQuery {
    /// Number of items; server default when absent, clamped to `max_k`.
    pub k: Option<usize>,
}

/// Shared, read-only state for the recommendation handlers
pub struct RecoHandlerState {
    pub engine: Arc<RecoEngine>,
    pub k_recs: usize,
    pub max_k: usize,
}

impl RecoHandlerState {
    fn resolve_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.k_recs).min(self.max_k)
    }
}

/// Parse the `user_id` path segment.
///
/// Any run of digits is an integer id; one too large for `UserId` is past the
/// id bound and so an unknown user. Everything else is malformed.
fn parse_user_id(raw: &str) -> Result<UserId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation {
            message: format!("user_id must be a non-negative integer, got {:?}", raw),
            loc: Some(serde_json::json!(["path", "user_id"])),
        });
    }

    raw.parse::<UserId>()
        .map_err(|_| AppError::UserNotFound(raw.to_string()))
}

/// GET /reco/{model_name}/{user_id}?k={k}
#[get("/{model_name}/{user_id}")]
pub async fn get_reco(
    path: web::Path<(String, String)>,
    query: web::Query<RecoQuery>,
    state: web::Data<RecoHandlerState>,
) -> Result<HttpResponse> {
    let (model_name, raw_user_id) = path.into_inner();
    let user_id = parse_user_id(&raw_user_id)?;
    let k = state.resolve_k(query.k);

    info!("Request for model: {}, user_id: {}, k: {}", model_name, user_id, k);

    let items = state.engine.get_reco(&model_name, user_id, k)?;

    Ok(HttpResponse::Ok().json(RecoResponse { user_id, items }))
}
