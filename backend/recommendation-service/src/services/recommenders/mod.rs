mod knn;
mod offline;
mod popular;

use crate::models::{ItemId, ModelKind, ModelStatus, UserId};

pub use knn::{KnnRecommender, SimilarityIndex, WatchHistory};
pub use offline::OfflineRecommender;
pub use popular::PopularRecommender;

/// Capability shared by every model variant.
///
/// Implementations hold read-only state loaded at startup, so calls are
/// plain reads and safe to share across request workers.
pub trait Recommender: Send + Sync {
    /// Whether the model has any signal for `user_id`.
    fn is_known(&self, user_id: UserId) -> bool;

    /// Ordered candidates for a known user. May hold more or fewer than `k`
    /// items; trimming and backfill happen in the engine.
    fn recommend(&self, user_id: UserId, k: usize) -> Vec<ItemId>;

    fn kind(&self) -> ModelKind;

    fn status(&self) -> ModelStatus;
}
