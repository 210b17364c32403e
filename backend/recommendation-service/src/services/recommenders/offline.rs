use std::collections::HashMap;

use super::Recommender;
use crate::artifacts::OfflineArtifact;
use crate::models::{ItemId, ModelKind, ModelStatus, UserId};

/// Serves recommendations computed offline, one stored list per user.
#[derive(Debug, Clone)]
pub struct OfflineRecommender {
    recos: Option<HashMap<UserId, Vec<ItemId>>>,
    status: ModelStatus,
}

impl OfflineRecommender {
    pub fn new(recos: OfflineArtifact) -> Self {
        Self {
            recos: Some(recos),
            status: ModelStatus::Ready,
        }
    }

    /// No table could be loaded; every user is unknown.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            recos: None,
            status: ModelStatus::Degraded(reason.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.recos.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recommender for OfflineRecommender {
    fn is_known(&self, user_id: UserId) -> bool {
        self.recos
            .as_ref()
            .is_some_and(|recos| recos.contains_key(&user_id))
    }

    /// The stored list verbatim, untrimmed.
    fn recommend(&self, user_id: UserId, _k: usize) -> Vec<ItemId> {
        self.recos
            .as_ref()
            .and_then(|recos| recos.get(&user_id))
            .cloned()
            .unwrap_or_default()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Offline
    }

    fn status(&self) -> ModelStatus {
        self.status.clone()
    }
}
