//! Artifact entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::storekey::StoreKey;

/// An output file or object produced by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique artifact identifier.
    pub id: String,

    /// Artifact name.
    pub name: String,

    /// Artifact kind.
    pub kind: String,

    /// Project the artifact belongs to.
    pub project: String,

    /// Path of the backing object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Fields this core does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Artifact {
    /// Store key addressing this artifact.
    pub fn store_key(&self) -> StoreKey {
        StoreKey::artifact(&self.project, &self.kind, &self.name, &self.id)
    }
}
