//! Run metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata attached to a Run.
///
/// Immutable after creation except through [`RunMetadata::touch`], which
/// refreshes the `updated` timestamp on persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Project the run belongs to.
    pub project: String,

    /// Name of the run; defaults to its id.
    pub name: String,

    /// Origin of the run, if it was imported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// User-supplied labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    /// When the run was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// When the run was last persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl RunMetadata {
    /// Create metadata for a new run, stamping creation time.
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            project: project.into(),
            name: name.into(),
            source: None,
            labels: None,
            created: Some(now),
            updated: Some(now),
        }
    }

    /// Refresh the `updated` timestamp.
    pub fn touch(&mut self) {
        self.updated = Some(Utc::now());
    }
}
