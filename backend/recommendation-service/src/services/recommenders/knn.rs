use std::collections::HashMap;

use super::Recommender;
use crate::artifacts::{InternalId, SimilarityArtifact};
use crate::models::{Interaction, ItemId, ModelKind, ModelStatus, UserId};
use crate::utils::unique_in_order;

/// Precomputed user-user similarity, addressed by internal row ids.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    users_mapping: HashMap<UserId, InternalId>,
    users_inv_mapping: HashMap<InternalId, UserId>,
    neighbors: HashMap<InternalId, Vec<(InternalId, f32)>>,
}

impl SimilarityIndex {
    pub fn from_artifact(artifact: SimilarityArtifact) -> Self {
        let users_inv_mapping = artifact
            .users_mapping
            .iter()
            .map(|(user_id, internal)| (*internal, *user_id))
            .collect();

        Self {
            users_mapping: artifact.users_mapping,
            users_inv_mapping,
            neighbors: artifact.neighbors,
        }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users_mapping.contains_key(&user_id)
    }

    /// Up to `n` most similar users with their scores, as external ids.
    /// Neighbors without an external mapping are dropped.
    pub fn similar_users(&self, user_id: UserId, n: usize) -> Vec<(UserId, f32)> {
        let Some(internal) = self.users_mapping.get(&user_id) else {
            return Vec::new();
        };

        self.neighbors
            .get(internal)
            .map(|neighbors| {
                neighbors
                    .iter()
                    .take(n)
                    .filter_map(|(neighbor, score)| {
                        self.users_inv_mapping
                            .get(neighbor)
                            .map(|external| (*external, *score))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Most recent items per user, built from the interaction log.
#[derive(Debug, Clone, Default)]
pub struct WatchHistory {
    items: HashMap<UserId, Vec<ItemId>>,
}

impl WatchHistory {
    /// Keep the first `history_len` records per user in log order.
    pub fn from_interactions(interactions: &[Interaction], history_len: usize) -> Self {
        let mut items: HashMap<UserId, Vec<ItemId>> = HashMap::new();

        for interaction in interactions {
            let watched = items.entry(interaction.user_id).or_default();
            if watched.len() < history_len {
                watched.push(interaction.item_id);
            }
        }

        Self { items }
    }

    /// `None` means no signal for the user, as opposed to an empty history.
    pub fn get(&self, user_id: UserId) -> Option<&[ItemId]> {
        self.items.get(&user_id).map(Vec::as_slice)
    }
}

/// Nearest-neighbor model: recommends what similar users watched.
#[derive(Debug, Clone)]
pub struct KnnRecommender {
    index: Option<SimilarityIndex>,
    history: WatchHistory,
    n_users: usize,
    status: ModelStatus,
}

impl KnnRecommender {
    pub fn new(index: SimilarityIndex, history: WatchHistory, n_users: usize) -> Self {
        Self {
            index: Some(index),
            history,
            n_users,
            status: ModelStatus::Ready,
        }
    }

    /// No index could be loaded; every user is unknown.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            index: None,
            history: WatchHistory::default(),
            n_users: 0,
            status: ModelStatus::Degraded(reason.into()),
        }
    }

    /// Users present in the similarity index.
    pub fn known_users(&self) -> usize {
        self.index
            .as_ref()
            .map_or(0, |index| index.users_mapping.len())
    }
}

impl Recommender for KnnRecommender {
    fn is_known(&self, user_id: UserId) -> bool {
        self.index
            .as_ref()
            .is_some_and(|index| index.contains(user_id))
    }

    /// Deduplicated items from the neighbors' histories, closest neighbor
    /// first. Not trimmed to `k`.
    fn recommend(&self, user_id: UserId, _k: usize) -> Vec<ItemId> {
        let Some(index) = self.index.as_ref() else {
            return Vec::new();
        };

        let candidates = index
            .similar_users(user_id, self.n_users)
            .into_iter()
            .filter(|(neighbor, _)| *neighbor != user_id)
            .filter_map(|(neighbor, _)| self.history.get(neighbor))
            .flat_map(|items| items.iter().copied());

        unique_in_order(candidates)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Knn
    }

    fn status(&self) -> ModelStatus {
        self.status.clone()
    }
}
