//! Validation and extraction of engine results.

use serde_json::{json, Value};

use flowrun_runtime::RuntimeError;

use crate::engine::{EngineRunResult, PhaseTiming};

/// Fields extracted from a validated engine result.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResults {
    /// Output model name.
    pub name: String,

    /// Path of the produced table, `sql://postgres/db/schema/table`.
    pub path: String,

    /// Raw SQL source.
    pub raw_code: String,

    /// Compiled SQL.
    pub compiled_code: String,

    /// Compile/execute phase timing block.
    pub timing: Value,
}

/// Validate the engine result against the expected project/output
/// identity and extract the fields the run status needs.
pub fn parse_results(
    result: &EngineRunResult,
    output: &str,
    project: &str,
) -> Result<ParsedResults, RuntimeError> {
    validate_result(result, output, project)?;
    let timing = json!({
        "compile": phase_timing(&result.timing, "compile")?,
        "execute": phase_timing(&result.timing, "execute")?,
    });
    Ok(ParsedResults {
        name: result.node_name.clone(),
        path: result_path(&result.relation_name),
        raw_code: result.raw_code.clone(),
        compiled_code: result.compiled_code.clone(),
        timing,
    })
}

fn validate_result(
    result: &EngineRunResult,
    output: &str,
    project: &str,
) -> Result<(), RuntimeError> {
    if result.status != "success" {
        return Err(RuntimeError::Execution(format!(
            "engine reported status '{}'",
            result.status
        )));
    }
    // Engines normalize dashes in project names to underscores.
    let expected_package = project.replace('-', "_");
    if result.package_name != expected_package {
        return Err(RuntimeError::Execution(format!(
            "engine ran project '{}', expected '{}'",
            result.package_name, expected_package
        )));
    }
    if result.node_name != output {
        return Err(RuntimeError::Execution(format!(
            "engine built output '{}', expected '{}'",
            result.node_name, output
        )));
    }
    Ok(())
}

/// Turn a qualified relation name into a store path.
fn result_path(relation_name: &str) -> String {
    let components = relation_name
        .replace('"', "")
        .split('.')
        .collect::<Vec<_>>()
        .join("/");
    format!("sql://postgres/{components}")
}

fn phase_timing(timing: &[PhaseTiming], phase: &str) -> Result<Value, RuntimeError> {
    let entry = timing
        .iter()
        .find(|t| t.name == phase)
        .ok_or_else(|| RuntimeError::Execution(format!("missing timing for phase '{phase}'")))?;
    match (entry.started_at, entry.completed_at) {
        (Some(started), Some(completed)) => Ok(json!({
            "started_at": started.to_rfc3339(),
            "completed_at": completed.to_rfc3339(),
        })),
        _ => Err(RuntimeError::Execution(format!(
            "incomplete timing for phase '{phase}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result() -> EngineRunResult {
        let now = Utc::now();
        EngineRunResult {
            status: "success".to_string(),
            package_name: "my_project".to_string(),
            node_name: "t2".to_string(),
            relation_name: "\"db\".\"schema\".\"t2_vabc\"".to_string(),
            raw_code: "select * from t1_v1".to_string(),
            compiled_code: "select * from \"t1_v1\"".to_string(),
            timing: vec![
                PhaseTiming {
                    name: "compile".to_string(),
                    started_at: Some(now),
                    completed_at: Some(now),
                },
                PhaseTiming {
                    name: "execute".to_string(),
                    started_at: Some(now),
                    completed_at: Some(now),
                },
            ],
        }
    }

    #[test]
    fn test_parse_success() {
        let parsed = parse_results(&result(), "t2", "my-project").unwrap();
        assert_eq!(parsed.name, "t2");
        assert_eq!(parsed.path, "sql://postgres/db/schema/t2_vabc");
        assert!(parsed.timing["compile"]["started_at"].is_string());
        assert!(parsed.timing["execute"]["completed_at"].is_string());
    }

    #[test]
    fn test_parse_rejects_non_success() {
        let mut failed = result();
        failed.status = "error".to_string();
        let err = parse_results(&failed, "t2", "my-project").unwrap_err();
        assert!(matches!(err, RuntimeError::Execution(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_project() {
        let err = parse_results(&result(), "t2", "other").unwrap_err();
        assert!(err.to_string().contains("expected 'other'"));
    }

    #[test]
    fn test_parse_rejects_wrong_output() {
        let err = parse_results(&result(), "t3", "my-project").unwrap_err();
        assert!(err.to_string().contains("expected 't3'"));
    }

    #[test]
    fn test_parse_rejects_incomplete_timing() {
        let mut incomplete = result();
        incomplete.timing[1].completed_at = None;
        let err = parse_results(&incomplete, "t2", "my-project").unwrap_err();
        assert!(err.to_string().contains("incomplete timing"));
    }

    #[test]
    fn test_parse_rejects_missing_phase() {
        let mut missing = result();
        missing.timing.remove(0);
        let err = parse_results(&missing, "t2", "my-project").unwrap_err();
        assert!(err.to_string().contains("missing timing"));
    }
}
