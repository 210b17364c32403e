use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::config::Config;
use recommendation_service::handlers::RecoHandlerState;
use recommendation_service::middleware::JwtVerifier;
use recommendation_service::services::{ModelRegistry, RecoEngine};

#[actix_web::main]
async fn main() -> Result<()> {
    init_tracing();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting recommendation-service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Models are fully loaded (or marked degraded) before the server binds.
    let registry = ModelRegistry::from_config(&config);
    for model in registry.models_info() {
        if !model.status.is_ready() {
            warn!(model = %model.name, kind = model.kind.as_str(), "Model is degraded");
        }
    }

    let verifier = match config.auth.jwt_secret.as_deref() {
        Some(secret) => Some(Arc::new(JwtVerifier::new(secret, config.jwt_algorithm()?))),
        None => {
            warn!("auth.jwt_secret is not set - /reco is served without authentication");
            None
        }
    };

    let state = web::Data::new(RecoHandlerState {
        engine: Arc::new(RecoEngine::new(registry)),
        k_recs: config.reco.k_recs,
        max_k: config.reco.max_k,
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("HTTP server listening on {}", bind_addr);

    let mut server = HttpServer::new(move || {
        let state = state.clone();
        let verifier = verifier.clone();

        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| recommendation_service::configure(cfg, state, verifier))
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,recommendation_service=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
