//! Dataitem entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::RevisionId;
use crate::storekey::StoreKey;

/// A versioned data entity produced or consumed by runs.
///
/// A dataitem's id is its revision: the same table name can exist at
/// many immutable revisions, and runs always address one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataitem {
    /// Revision id of this dataitem.
    pub id: RevisionId,

    /// Dataitem name (the table name for SQL-backed dataitems).
    pub name: String,

    /// Dataitem kind.
    pub kind: String,

    /// Project the dataitem belongs to.
    pub project: String,

    /// Path of the backing data, e.g. `sql://postgres/db/schema/table`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Extension fields (raw/compiled code for transform outputs, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataitem {
    /// Create a dataitem at a given revision.
    pub fn new(
        project: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        id: RevisionId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
            project: project.into(),
            path: None,
            extra: Map::new(),
        }
    }

    /// Builder method to set the backing path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Builder method to attach an extension field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Store key addressing this dataitem revision.
    pub fn store_key(&self) -> StoreKey {
        StoreKey::dataitem(&self.project, &self.kind, &self.name, self.id.as_str())
    }
}
