use actix_web::{get, web, HttpResponse};

use super::RecoHandlerState;

/// GET /models
///
/// Registered models with their load status.
#[get("/models")]
pub async fn list_models(state: web::Data<RecoHandlerState>) -> HttpResponse {
    HttpResponse::Ok().json(state.engine.registry().models_info())
}
