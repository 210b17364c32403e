use tracing::debug;

use super::registry::ModelRegistry;
use crate::error::RecoError;
use crate::models::{ItemId, UserId, MAX_USER_ID};
use crate::utils::unique_in_order;

/// Resolves a model, asks it for items and backfills short results from the
/// popularity model.
pub struct RecoEngine {
    registry: ModelRegistry,
}

impl RecoEngine {
    pub fn new(registry: ModelRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Up to `k` distinct items for `user_id` from `model_name`.
    ///
    /// Fewer than `k` items come back only when the model and the popularity
    /// table together hold fewer than `k` distinct items.
    pub fn get_reco(
        &self,
        model_name: &str,
        user_id: UserId,
        k: usize,
    ) -> Result<Vec<ItemId>, RecoError> {
        if user_id > MAX_USER_ID {
            return Err(RecoError::UserNotFound(user_id));
        }

        let model = self.registry.resolve(model_name)?;

        if k == 0 {
            return Ok(Vec::new());
        }

        // An unknown user is an empty primary result, not an error.
        let primary = if model.is_known(user_id) {
            unique_in_order(model.recommend(user_id, k))
        } else {
            Vec::new()
        };

        if primary.len() >= k {
            return Ok(primary.into_iter().take(k).collect());
        }

        let primary_count = primary.len();
        let backfill = self.registry.fallback().top(k);
        let mut reco = unique_in_order(primary.into_iter().chain(backfill));
        reco.truncate(k);

        debug!(
            model = %model_name,
            user_id,
            primary = primary_count,
            total = reco.len(),
            "Backfilled recommendations from popular"
        );

        Ok(reco)
    }
}
