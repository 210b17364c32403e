use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::collections::HashMap;
use std::sync::Arc;

use recommendation_service::handlers::RecoHandlerState;
use recommendation_service::middleware::{Claims, JwtVerifier};
use recommendation_service::models::{ErrorResponse, RecoResponse};
use recommendation_service::services::{
    ModelRegistry, OfflineRecommender, PopularRecommender, RecoEngine,
};

const SECRET: &str = "integration-secret";

fn state(k_recs: usize) -> web::Data<RecoHandlerState> {
    let registry = ModelRegistry::new(
        "popular",
        PopularRecommender::new(vec![1, 2, 3, 4, 5, 6], 10),
    )
    .with_model(
        "userknn",
        OfflineRecommender::new(HashMap::from([(10, vec![42, 43, 42]), (11, Vec::new())])),
    )
    .with_model("dssm", OfflineRecommender::degraded("models/dssm.json: not found"));

    web::Data::new(RecoHandlerState {
        engine: Arc::new(RecoEngine::new(registry)),
        k_recs,
        max_k: 20,
    })
}

fn bearer(secret: &str) -> String {
    let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
    let token = encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: "bot".to_string(),
            exp,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token");
    format!("Bearer {}", token)
}

macro_rules! open_app {
    ($k_recs:expr) => {
        test::init_service(App::new().configure(|cfg| {
            recommendation_service::configure(cfg, state($k_recs), None)
        }))
        .await
    };
}

macro_rules! secured_app {
    () => {
        test::init_service(App::new().configure(|cfg| {
            recommendation_service::configure(
                cfg,
                state(5),
                Some(Arc::new(JwtVerifier::new(SECRET, Algorithm::HS256))),
            )
        }))
        .await
    };
}

#[actix_web::test]
async fn health_is_alive() {
    let app = secured_app!();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: String = test::read_body_json(resp).await;
    assert_eq!(body, "I am alive");
}

#[actix_web::test]
async fn popular_model_returns_table_prefix() {
    let app = open_app!(4);

    let req = test::TestRequest::get().uri("/reco/popular/1").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.user_id, 1);
    assert_eq!(resp.items, vec![1, 2, 3, 4]);
}

#[actix_web::test]
async fn query_k_overrides_default() {
    let app = open_app!(4);

    let req = test::TestRequest::get().uri("/reco/popular/1?k=2").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp.items, vec![1, 2]);

    let req = test::TestRequest::get().uri("/reco/popular/1?k=0").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.items.is_empty());
}

#[actix_web::test]
async fn known_user_is_deduplicated_and_backfilled() {
    let app = open_app!(5);

    let req = test::TestRequest::get().uri("/reco/userknn/10").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.items, vec![42, 43, 1, 2, 3]);
}

#[actix_web::test]
async fn unknown_user_gets_popular() {
    let app = open_app!(5);

    let req = test::TestRequest::get().uri("/reco/userknn/999").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.user_id, 999);
    assert_eq!(resp.items, vec![1, 2, 3, 4, 5]);
}

#[actix_web::test]
async fn degraded_model_still_answers() {
    let app = open_app!(3);

    let req = test::TestRequest::get().uri("/reco/dssm/10").to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.items, vec![1, 2, 3]);
}

#[actix_web::test]
async fn unknown_model_is_404() {
    let app = open_app!(5);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/reco/lightfm/10").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error_key, "model_not_found");
    assert_eq!(body.error_message, "Model lightfm not found");
}

#[actix_web::test]
async fn user_above_bound_is_404() {
    let app = open_app!(5);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/reco/popular/1000000001")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error_key, "user_not_found");
}

#[actix_web::test]
async fn user_wider_than_u64_is_404() {
    let app = open_app!(5);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/reco/popular/99999999999999999999")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error_key, "user_not_found");
    assert_eq!(body.error_message, "User 99999999999999999999 not found");
}

#[actix_web::test]
async fn malformed_user_id_is_validation_error() {
    let app = open_app!(5);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/reco/popular/abc").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error_key, "validation_error");
    assert_eq!(body.error_loc, Some(serde_json::json!(["path", "user_id"])));
}

#[actix_web::test]
async fn malformed_k_is_validation_error() {
    let app = open_app!(5);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/reco/popular/1?k=many").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn models_listing_reports_status() {
    let app = open_app!(5);

    let req = test::TestRequest::get().uri("/models").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let models = body.as_array().expect("array of models");
    assert_eq!(models.len(), 3);
    assert_eq!(models[0]["name"], "dssm");
    assert_eq!(models[0]["status"], "degraded");
    assert_eq!(models[1]["name"], "popular");
    assert_eq!(models[1]["status"], "ready");
}

#[actix_web::test]
async fn secured_reco_requires_token() {
    let app = secured_app!();

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/reco/popular/1").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error_key, "unauthorized");
}

#[actix_web::test]
async fn secured_reco_rejects_bad_token() {
    let app = secured_app!();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/reco/popular/1")
            .insert_header((header::AUTHORIZATION, bearer("wrong-secret")))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn secured_reco_accepts_valid_token() {
    let app = secured_app!();

    let req = test::TestRequest::get()
        .uri("/reco/popular/1")
        .insert_header((header::AUTHORIZATION, bearer(SECRET)))
        .to_request();
    let resp: RecoResponse = test::call_and_read_body_json(&app, req).await;

    assert_eq!(resp.items, vec![1, 2, 3, 4, 5]);
}
