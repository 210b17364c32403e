use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// External user identifier as it appears in request paths and artifacts.
pub type UserId = u64;

/// Catalog item identifier.
pub type ItemId = i64;

/// Largest user id the service accepts; anything above is rejected outright.
pub const MAX_USER_ID: UserId = 1_000_000_000;

/// Successful `/reco` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoResponse {
    pub user_id: UserId,
    pub items: Vec<ItemId>,
}

/// Structured error body shared by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_key: String,
    pub error_message: String,
    #[serde(default)]
    pub error_loc: Option<serde_json::Value>,
}

/// One row of the interaction log.
///
/// The log is expected in most-recent-first order per user, which is the
/// order the offline export produces.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_id: ItemId,
    #[serde(alias = "date")]
    pub last_watch_dt: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Popular,
    Offline,
    Knn,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Popular => "popular",
            ModelKind::Offline => "offline",
            ModelKind::Knn => "knn",
        }
    }
}

/// Load state of a model's backing artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ModelStatus {
    Ready,
    Degraded(String),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready)
    }
}

/// Entry of the `/models` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub kind: ModelKind,
    #[serde(flatten)]
    pub status: ModelStatus,
}
