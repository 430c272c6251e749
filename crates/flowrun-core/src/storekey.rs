//! Store keys addressing versioned entities in the backend.
//!
//! Entities produced by a run are referenced by a structured path of the
//! form `store://<project>/<entityType>/<kind>/<name>:<id>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Parsed store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreKey {
    /// Project the entity belongs to.
    pub project: String,

    /// Entity type segment, e.g. `dataitems` or `artifacts`.
    pub entity: String,

    /// Entity kind.
    pub kind: String,

    /// Entity name.
    pub name: String,

    /// Entity id (the revision for versioned entities).
    pub id: String,
}

impl StoreKey {
    /// Key for a dataitem.
    pub fn dataitem(
        project: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            entity: "dataitems".to_string(),
            kind: kind.into(),
            name: name.into(),
            id: id.into(),
        }
    }

    /// Key for an artifact.
    pub fn artifact(
        project: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            entity: "artifacts".to_string(),
            kind: kind.into(),
            name: name.into(),
            id: id.into(),
        }
    }

    /// Decode a store key string.
    pub fn parse(key: &str) -> Result<Self, CoreError> {
        let malformed = || CoreError::MalformedStoreKey(key.to_string());

        let rest = key.strip_prefix("store://").ok_or_else(malformed)?;
        let mut segments = rest.split('/');
        let project = segments.next().ok_or_else(malformed)?;
        let entity = segments.next().ok_or_else(malformed)?;
        let kind = segments.next().ok_or_else(malformed)?;
        let name_and_id = segments.next().ok_or_else(malformed)?;
        if segments.next().is_some() {
            return Err(malformed());
        }
        let (name, id) = name_and_id.split_once(':').ok_or_else(malformed)?;
        if [project, entity, kind, name, id].iter().any(|s| s.is_empty()) {
            return Err(malformed());
        }

        Ok(Self {
            project: project.to_string(),
            entity: entity.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store://{}/{}/{}/{}:{}",
            self.project, self.entity, self.kind, self.name, self.id
        )
    }
}
