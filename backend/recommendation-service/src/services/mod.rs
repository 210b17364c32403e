//! Recommendation services
//!
//! - `recommenders`: model variants behind the `Recommender` trait
//! - `registry`: name → model table built at startup
//! - `engine`: request resolution and popularity backfill

pub mod engine;
pub mod recommenders;
pub mod registry;

pub use engine::RecoEngine;
pub use recommenders::{
    KnnRecommender, OfflineRecommender, PopularRecommender, Recommender, SimilarityIndex,
    WatchHistory,
};
pub use registry::ModelRegistry;
