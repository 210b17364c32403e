use actix_web::{get, HttpResponse};

/// GET /health
///
/// Liveness only; answers even when every model is degraded.
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json("I am alive")
}
