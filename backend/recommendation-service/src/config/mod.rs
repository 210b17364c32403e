//! Service configuration
//!
//! Loads settings from (later sources win):
//! 1. Built-in defaults
//! 2. YAML file at `RECO_CONFIG_PATH` (default `config.yml`, optional)
//! 3. Environment variables, e.g. `RECO__SERVER__PORT=9000`

use anyhow::{anyhow, Result};
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use crate::models::ModelKind;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub reco: RecoConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub models: BTreeMap<String, ModelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 0 keeps the actix default (one worker per core).
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoConfig {
    /// Number of items returned when the request has no `k`.
    pub k_recs: usize,
    /// Upper clamp for a requested `k`.
    pub max_k: usize,
    /// Popularity model used to backfill short results.
    pub fallback_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens. Unset disables the check.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_jwt_algorithm")]
    pub jwt_algorithm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_algorithm: default_jwt_algorithm(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// CSV interaction log (`user_id,item_id,last_watch_dt,...`).
    #[serde(default)]
    pub interactions_path: Option<String>,
}

/// Per-model settings, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    Popular(PopularSpec),
    Offline(OfflineSpec),
    Knn(KnnSpec),
}

impl ModelSpec {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSpec::Popular(_) => ModelKind::Popular,
            ModelSpec::Offline(_) => ModelKind::Offline,
            ModelSpec::Knn(_) => ModelKind::Knn,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PopularSpec {
    /// Prebuilt popularity table. Built from the interaction log when unset.
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_popular_days")]
    pub days: i64,
    #[serde(default = "default_popular_max_k")]
    pub max_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfflineSpec {
    pub model_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnnSpec {
    pub model_path: String,
    #[serde(default = "default_knn_neighbors")]
    pub n_users: usize,
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

/// Longest popularity window accepted, in days.
pub const MAX_POPULAR_DAYS: i64 = 36_500;

fn default_jwt_algorithm() -> String {
    "HS256".to_string()
}

fn default_popular_days() -> i64 {
    30
}

fn default_popular_max_k() -> usize {
    10
}

fn default_knn_neighbors() -> usize {
    50
}

fn default_history_len() -> usize {
    10
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let path = env::var("RECO_CONFIG_PATH").unwrap_or_else(|_| "config.yml".to_string());
        Self::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", 0)?
            .set_default("reco.k_recs", 10)?
            .set_default("reco.max_k", 100)?
            .set_default("reco.fallback_model", "popular")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("RECO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn jwt_algorithm(&self) -> Result<Algorithm> {
        let algorithm = Algorithm::from_str(&self.auth.jwt_algorithm)
            .map_err(|e| anyhow!("Unsupported JWT algorithm {}: {}", self.auth.jwt_algorithm, e))?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(anyhow!("JWT algorithm {:?} needs a key pair, only HMAC is supported", other)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.reco.k_recs == 0 {
            return Err(anyhow!("reco.k_recs must be greater than 0"));
        }

        if self.reco.k_recs > self.reco.max_k {
            return Err(anyhow!(
                "reco.k_recs ({}) must not exceed reco.max_k ({})",
                self.reco.k_recs,
                self.reco.max_k
            ));
        }

        match self.models.get(&self.reco.fallback_model) {
            Some(ModelSpec::Popular(_)) => {}
            Some(other) => {
                return Err(anyhow!(
                    "Fallback model {} must be of kind popular, got {}",
                    self.reco.fallback_model,
                    other.kind().as_str()
                ))
            }
            None => {
                return Err(anyhow!(
                    "Fallback model {} is not configured",
                    self.reco.fallback_model
                ))
            }
        }

        for (name, spec) in &self.models {
            if let ModelSpec::Popular(spec) = spec {
                if !(1..=MAX_POPULAR_DAYS).contains(&spec.days) {
                    return Err(anyhow!(
                        "models.{}.days must be between 1 and {}, got {}",
                        name,
                        MAX_POPULAR_DAYS,
                        spec.days
                    ));
                }
            }
        }

        if self.auth.jwt_secret.is_some() {
            self.jwt_algorithm()?;
        }

        Ok(())
    }
}
