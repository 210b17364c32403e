//! Readers for the offline-built model artifacts.
//!
//! Formats:
//! - popularity table: `{"items": [item, ...]}`
//! - offline table: `{"<user_id>": [item, ...], ...}`
//! - similarity index: `{"users_mapping": {"<user_id>": idx}, "neighbors": {"<idx>": [[idx, score], ...]}}`
//! - interaction log: CSV with at least `user_id,item_id,last_watch_dt`

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ArtifactError;
use crate::models::{Interaction, ItemId, UserId};

/// Internal row index of a user inside the similarity index.
pub type InternalId = u32;

#[derive(Debug, Clone, Deserialize)]
pub struct PopularArtifact {
    pub items: Vec<ItemId>,
}

pub type OfflineArtifact = HashMap<UserId, Vec<ItemId>>;

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityArtifact {
    pub users_mapping: HashMap<UserId, InternalId>,
    /// Neighbors per internal id, most similar first.
    pub neighbors: HashMap<InternalId, Vec<(InternalId, f32)>>,
}

pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ArtifactError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Read the interaction log, keeping file order.
pub fn read_interactions(path: impl AsRef<Path>) -> Result<Vec<Interaction>, ArtifactError> {
    let path = path.as_ref();
    let csv_error = |source: csv::Error| ArtifactError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    reader
        .deserialize::<Interaction>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_error)
}
