use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use super::Recommender;
use crate::models::{Interaction, ItemId, ModelKind, ModelStatus, UserId};

/// Popularity baseline: the most watched items in a trailing window.
///
/// Has no per-user state, so every user is known. This is the model the
/// engine backfills short results from.
#[derive(Debug, Clone)]
pub struct PopularRecommender {
    items: Vec<ItemId>,
    status: ModelStatus,
}

impl PopularRecommender {
    /// Wrap a prebuilt table, capped at `max_k` entries.
    pub fn new(mut items: Vec<ItemId>, max_k: usize) -> Self {
        items.truncate(max_k);
        Self {
            items,
            status: ModelStatus::Ready,
        }
    }

    /// Empty table used when neither the artifact nor the log could be read.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            status: ModelStatus::Degraded(reason.into()),
        }
    }

    /// Build the table from an interaction log.
    ///
    /// Only records dated strictly after `max(date) - days` count. Items are
    /// ranked by count, descending; equal counts keep the order in which the
    /// item first appears in the window. A window reaching past the earliest
    /// representable date covers the whole log.
    pub fn fit(interactions: &[Interaction], days: i64, max_k: usize) -> Self {
        let Some(max_date) = interactions.iter().map(|i| i.last_watch_dt).max() else {
            return Self::new(Vec::new(), max_k);
        };
        let min_date = Duration::try_days(days)
            .and_then(|window| max_date.checked_sub_signed(window))
            .unwrap_or(NaiveDate::MIN);

        // item -> (count, first position in window)
        let mut counts: HashMap<ItemId, (usize, usize)> = HashMap::new();
        for (position, interaction) in interactions
            .iter()
            .filter(|i| i.last_watch_dt > min_date)
            .enumerate()
        {
            counts
                .entry(interaction.item_id)
                .and_modify(|(count, _)| *count += 1)
                .or_insert((1, position));
        }

        let mut ranked: Vec<(ItemId, usize, usize)> = counts
            .into_iter()
            .map(|(item_id, (count, first_seen))| (item_id, count, first_seen))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        let items = ranked.into_iter().map(|(item_id, _, _)| item_id).collect();
        Self::new(items, max_k)
    }

    /// First `min(k, len)` entries of the table.
    pub fn top(&self, k: usize) -> Vec<ItemId> {
        self.items.iter().take(k).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Recommender for PopularRecommender {
    fn is_known(&self, _user_id: UserId) -> bool {
        true
    }

    fn recommend(&self, _user_id: UserId, k: usize) -> Vec<ItemId> {
        self.top(k)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Popular
    }

    fn status(&self) -> ModelStatus {
        self.status.clone()
    }
}
