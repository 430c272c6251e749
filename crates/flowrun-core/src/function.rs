//! Function documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Function as stored in the backend: a declared unit of work
/// independent of any particular execution.
///
/// Loose-typed on purpose; the core only reads its spec as a merge
/// source during `build`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Unique function identifier.
    pub id: String,

    /// Function name.
    pub name: String,

    /// Function kind; selects the Runtime that executes it.
    pub kind: String,

    /// Project the function belongs to.
    pub project: String,

    /// Declared defaults merged into every run of this function.
    #[serde(default)]
    pub spec: Map<String, Value>,

    /// Fields this core does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unmodeled_fields_survive_round_trip() {
        let value = json!({
            "id": "f1",
            "name": "myfn",
            "kind": "transform",
            "project": "proj",
            "spec": {"sql": "select 1"},
            "status": {"state": "CREATED"},
        });
        let function: Function = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(function.spec["sql"], "select 1");
        assert!(function.extra.contains_key("status"));
        assert_eq!(serde_json::to_value(&function).unwrap(), value);
    }
}
