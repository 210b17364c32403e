use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::recommenders::{
    KnnRecommender, OfflineRecommender, PopularRecommender, Recommender, SimilarityIndex,
    WatchHistory,
};
use crate::artifacts::{self, OfflineArtifact, PopularArtifact, SimilarityArtifact};
use crate::config::{Config, KnnSpec, ModelSpec, OfflineSpec, PopularSpec};
use crate::error::RecoError;
use crate::models::{Interaction, ModelInfo};

/// Name → model table, fixed once startup loading is done.
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn Recommender>>,
    fallback: Arc<PopularRecommender>,
}

impl ModelRegistry {
    /// Registry holding only the popularity model used for backfill.
    pub fn new(fallback_name: impl Into<String>, fallback: PopularRecommender) -> Self {
        let fallback = Arc::new(fallback);
        let mut models: BTreeMap<String, Arc<dyn Recommender>> = BTreeMap::new();
        models.insert(fallback_name.into(), fallback.clone());

        Self { models, fallback }
    }

    pub fn with_model<R>(mut self, name: impl Into<String>, model: R) -> Self
    where
        R: Recommender + 'static,
    {
        self.models.insert(name.into(), Arc::new(model));
        self
    }

    /// Load every configured model. Artifact failures degrade the affected
    /// model instead of aborting startup.
    pub fn from_config(config: &Config) -> Self {
        let interactions = if needs_interactions(config) {
            Some(load_interactions(config.data.interactions_path.as_deref()))
        } else {
            None
        };
        let interactions = interactions.as_ref().map(|loaded| loaded.as_deref());

        let fallback_name = config.reco.fallback_model.as_str();
        let fallback = match config.models.get(fallback_name) {
            Some(ModelSpec::Popular(spec)) => load_popular(fallback_name, spec, interactions),
            _ => {
                warn!(model = %fallback_name, "Fallback model is not a configured popular model");
                PopularRecommender::degraded("fallback model not configured")
            }
        };

        let mut registry = Self::new(fallback_name, fallback);
        for (name, spec) in &config.models {
            if name == fallback_name {
                continue;
            }

            let model: Arc<dyn Recommender> = match spec {
                ModelSpec::Popular(spec) => Arc::new(load_popular(name, spec, interactions)),
                ModelSpec::Offline(spec) => Arc::new(load_offline(name, spec)),
                ModelSpec::Knn(spec) => Arc::new(load_knn(name, spec, interactions)),
            };
            registry.models.insert(name.clone(), model);
        }

        info!(
            "Model registry ready: {} models, fallback={} ({} items)",
            registry.models.len(),
            fallback_name,
            registry.fallback.len()
        );

        registry
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn Recommender, RecoError> {
        self.models
            .get(name)
            .map(|model| model.as_ref())
            .ok_or_else(|| RecoError::ModelNotFound(name.to_string()))
    }

    pub fn fallback(&self) -> &PopularRecommender {
        &self.fallback
    }

    pub fn models_info(&self) -> Vec<ModelInfo> {
        self.models
            .iter()
            .map(|(name, model)| ModelInfo {
                name: name.clone(),
                kind: model.kind(),
                status: model.status(),
            })
            .collect()
    }
}

fn needs_interactions(config: &Config) -> bool {
    config.models.values().any(|spec| match spec {
        ModelSpec::Popular(spec) => spec.model_path.is_none(),
        ModelSpec::Knn(_) => true,
        ModelSpec::Offline(_) => false,
    })
}

fn load_interactions(path: Option<&str>) -> Result<Vec<Interaction>, String> {
    let Some(path) = path else {
        return Err("data.interactions_path is not configured".to_string());
    };

    match artifacts::read_interactions(path) {
        Ok(interactions) => {
            info!("Loaded {} interactions from {}", interactions.len(), path);
            Ok(interactions)
        }
        Err(e) => {
            warn!(error = %e, "Interaction log unavailable");
            Err(e.to_string())
        }
    }
}

fn load_popular(
    name: &str,
    spec: &PopularSpec,
    interactions: Option<Result<&[Interaction], &String>>,
) -> PopularRecommender {
    if let Some(path) = spec.model_path.as_deref() {
        return match artifacts::read_json::<PopularArtifact>(path) {
            Ok(artifact) => {
                let model = PopularRecommender::new(artifact.items, spec.max_k);
                info!(model = %name, items = model.len(), "Loaded popularity table");
                model
            }
            Err(e) => {
                warn!(model = %name, error = %e, "Popularity table unavailable");
                PopularRecommender::degraded(e.to_string())
            }
        };
    }

    match interactions {
        Some(Ok(interactions)) => {
            let model = PopularRecommender::fit(interactions, spec.days, spec.max_k);
            info!(
                model = %name,
                items = model.len(),
                days = spec.days,
                "Built popularity table from interaction log"
            );
            model
        }
        Some(Err(reason)) => {
            warn!(model = %name, reason = %reason, "Popularity table cannot be built");
            PopularRecommender::degraded(reason.clone())
        }
        None => PopularRecommender::degraded("interaction log not loaded"),
    }
}

fn load_offline(name: &str, spec: &OfflineSpec) -> OfflineRecommender {
    match artifacts::read_json::<OfflineArtifact>(&spec.model_path) {
        Ok(recos) => {
            let model = OfflineRecommender::new(recos);
            info!(model = %name, users = model.len(), "Loaded offline recommendations");
            model
        }
        Err(e) => {
            warn!(model = %name, error = %e, "Offline recommendations unavailable, all users unknown");
            OfflineRecommender::degraded(e.to_string())
        }
    }
}

fn load_knn(
    name: &str,
    spec: &KnnSpec,
    interactions: Option<Result<&[Interaction], &String>>,
) -> KnnRecommender {
    let index = match artifacts::read_json::<SimilarityArtifact>(&spec.model_path) {
        Ok(artifact) => SimilarityIndex::from_artifact(artifact),
        Err(e) => {
            warn!(model = %name, error = %e, "Similarity index unavailable, all users unknown");
            return KnnRecommender::degraded(e.to_string());
        }
    };

    let history = match interactions {
        Some(Ok(interactions)) => WatchHistory::from_interactions(interactions, spec.history_len),
        Some(Err(reason)) => {
            warn!(model = %name, reason = %reason, "Watch history unavailable, all users unknown");
            return KnnRecommender::degraded(reason.clone());
        }
        None => return KnnRecommender::degraded("interaction log not loaded"),
    };

    let model = KnnRecommender::new(index, history, spec.n_users);
    info!(
        model = %name,
        users = model.known_users(),
        n_users = spec.n_users,
        "Loaded similarity model"
    );
    model
}
