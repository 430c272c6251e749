//! SQL-transform runtime for Flowrun.
//!
//! Executes `transform` tasks: materializes each named input as an
//! immutable versioned table, delegates compilation and execution to an
//! external [`SqlEngine`], validates the result and registers the
//! produced table as a new dataitem revision.

pub mod engine;
pub mod results;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use flowrun_client::{entities, BackendClient};
use flowrun_core::{Dataitem, RevisionId, RunDocument};
use flowrun_runtime::{Runtime, RuntimeError};

pub use engine::{
    EngineError, EngineProject, EngineRunResult, InputModel, OutputModel, PhaseTiming, SqlEngine,
};
pub use results::ParsedResults;

/// Task kind this runtime executes.
pub const TRANSFORM_TASK: &str = "transform";

/// Kind assigned to dataitems produced by a transform.
const DATAITEM_KIND: &str = "sql";

/// Runtime executing SQL transforms through an external engine.
pub struct SqlRuntime {
    client: Arc<dyn BackendClient>,
    engine: Arc<dyn SqlEngine>,
}

impl SqlRuntime {
    /// Create a new runtime over a backend client and an engine.
    pub fn new(client: Arc<dyn BackendClient>, engine: Arc<dyn SqlEngine>) -> Self {
        Self { client, engine }
    }

    /// Execute a transform task.
    async fn transform(&self, run: &RunDocument) -> Result<Value, RuntimeError> {
        let project = &run.project;
        let spec = &run.spec;

        let inputs = named_refs(spec.inputs.as_ref(), "inputs")?;
        let outputs = named_refs(spec.outputs.as_ref(), "outputs")?;
        let output = outputs.first().ok_or_else(|| {
            RuntimeError::Execution("outputs must name at least one table".to_string())
        })?;
        let sql = spec
            .extra
            .get("sql")
            .and_then(Value::as_str)
            .ok_or_else(|| RuntimeError::Execution("run spec carries no sql source".to_string()))?;

        info!(
            run_id = %run.id,
            project = %project,
            output = %output,
            inputs = inputs.len(),
            "Starting transform"
        );

        // Bind every input to the revision it has right now and snapshot
        // it, so the transform reads immutable tables.
        let mut bound_inputs = Vec::with_capacity(inputs.len());
        for name in &inputs {
            let dataitem = entities::get_dataitem(self.client.as_ref(), project, name)
                .await
                .map_err(|_| {
                    RuntimeError::Execution(format!(
                        "dataitem '{name}' not found in project '{project}'"
                    ))
                })?;
            let input = InputModel {
                name: name.clone(),
                revision: dataitem.id.clone(),
            };
            debug!(table = %input.table(), "Materializing input");
            self.engine
                .materialize(&input, &dataitem)
                .await
                .map_err(|e| RuntimeError::Execution(e.to_string()))?;
            bound_inputs.push(input);
        }

        let revision = RevisionId::generate();
        let engine_project = EngineProject {
            project: project.clone(),
            inputs: bound_inputs,
            output: OutputModel {
                name: output.clone(),
                revision: revision.clone(),
            },
            sql: sql.to_string(),
        };

        let result = self
            .engine
            .execute(&engine_project)
            .await
            .map_err(|e| RuntimeError::Execution(e.to_string()))?;
        let parsed = results::parse_results(&result, output, project)?;

        let dataitem = Dataitem::new(project, &parsed.name, DATAITEM_KIND, revision)
            .with_path(&parsed.path)
            .with_extra("raw_code", json!(parsed.raw_code))
            .with_extra("compiled_code", json!(parsed.compiled_code));
        let dataitem = entities::new_dataitem(self.client.as_ref(), dataitem)
            .await
            .map_err(|e| RuntimeError::Execution(format!("dataitem registration failed: {e}")))?;

        info!(
            run_id = %run.id,
            dataitem = %dataitem.store_key(),
            "Transform completed"
        );

        Ok(json!({
            "state": "COMPLETED",
            "dataitems": [{
                "key": output,
                "kind": dataitem.kind,
                "id": dataitem.store_key().to_string(),
            }],
            "timing": parsed.timing,
        }))
    }
}

#[async_trait]
impl Runtime for SqlRuntime {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn supported_tasks(&self) -> &'static [&'static str] {
        &[TRANSFORM_TASK]
    }

    async fn run(&self, run: &RunDocument) -> Result<Value, RuntimeError> {
        run.ensure_can_execute()?;
        let reference = run.spec.task_reference()?;
        match reference.task_kind.as_str() {
            TRANSFORM_TASK => self.transform(run).await,
            other => Err(RuntimeError::UnsupportedTask {
                task: other.to_string(),
                runtime: self.name().to_string(),
            }),
        }
    }
}

/// Validate a spec field as a sequence of named references.
fn named_refs(value: Option<&Value>, field: &str) -> Result<Vec<String>, RuntimeError> {
    let invalid =
        || RuntimeError::Execution(format!("{field} must be a list of named references"));
    let items = value.and_then(Value::as_array).ok_or_else(invalid)?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flowrun_client::LocalClient;
    use flowrun_core::{CoreError, RunSpec, RunStatus, State, TaskId};
    use tokio::sync::Mutex;

    /// Engine stub recording materializations and replaying a
    /// configurable result.
    struct StubEngine {
        status: String,
        omit_execute_timing: bool,
        materialized: Mutex<Vec<String>>,
    }

    impl StubEngine {
        fn succeeding() -> Self {
            Self {
                status: "success".to_string(),
                omit_execute_timing: false,
                materialized: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                status: "error".to_string(),
                ..Self::succeeding()
            }
        }
    }

    #[async_trait]
    impl SqlEngine for StubEngine {
        async fn materialize(
            &self,
            input: &InputModel,
            _dataitem: &Dataitem,
        ) -> Result<(), EngineError> {
            self.materialized.lock().await.push(input.table());
            Ok(())
        }

        async fn execute(&self, project: &EngineProject) -> Result<EngineRunResult, EngineError> {
            let now = Utc::now();
            let execute_timing = PhaseTiming {
                name: "execute".to_string(),
                started_at: Some(now),
                completed_at: (!self.omit_execute_timing).then_some(now),
            };
            Ok(EngineRunResult {
                status: self.status.clone(),
                package_name: project.project.replace('-', "_"),
                node_name: project.output.name.clone(),
                relation_name: format!("\"db\".\"schema\".\"{}\"", project.output.table()),
                raw_code: project.sql.clone(),
                compiled_code: project.sql.clone(),
                timing: vec![
                    PhaseTiming {
                        name: "compile".to_string(),
                        started_at: Some(now),
                        completed_at: Some(now),
                    },
                    execute_timing,
                ],
            })
        }
    }

    fn pending_run() -> RunDocument {
        let mut spec = RunSpec::new("transform+transform://ns/myfn:f1", TaskId::new("t-1"));
        spec.inputs = Some(json!(["t1"]));
        spec.outputs = Some(json!(["t2"]));
        spec.extra
            .insert("sql".to_string(), json!("select * from t1"));
        let mut run = RunDocument::new("my-project", "run", spec);
        run.status = RunStatus::with_state(State::Pending);
        run
    }

    async fn client_with_input() -> Arc<LocalClient> {
        let client = Arc::new(LocalClient::new());
        let input = Dataitem::new("my-project", "t1", "sql", "rev1".into());
        entities::new_dataitem(client.as_ref(), input).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_transform_produces_dataitem() {
        let client = client_with_input().await;
        let engine = Arc::new(StubEngine::succeeding());
        let runtime = SqlRuntime::new(client.clone(), engine.clone());

        let status = runtime.run(&pending_run()).await.unwrap();

        assert_eq!(status["state"], "COMPLETED");
        let entry = &status["dataitems"][0];
        assert_eq!(entry["key"], "t2");
        assert_eq!(entry["kind"], "sql");
        let key = entry["id"].as_str().unwrap();
        assert!(key.starts_with("store://my-project/dataitems/sql/t2:"));
        assert!(status["timing"]["compile"]["started_at"].is_string());

        // The input was snapshotted at its current revision.
        assert_eq!(*engine.materialized.lock().await, vec!["t1_vrev1"]);

        // The produced dataitem resolves through its store key.
        let produced = entities::get_dataitem_from_key(client.as_ref(), key)
            .await
            .unwrap();
        assert_eq!(produced.name, "t2");
        assert_eq!(produced.extra["raw_code"], "select * from t1");
    }

    #[tokio::test]
    async fn test_transform_engine_failure() {
        let client = client_with_input().await;
        let runtime = SqlRuntime::new(client, Arc::new(StubEngine::failing()));

        let err = runtime.run(&pending_run()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Execution(_)));
        assert!(err.to_string().contains("status 'error'"));
    }

    #[tokio::test]
    async fn test_transform_incomplete_timing() {
        let client = client_with_input().await;
        let engine = StubEngine {
            omit_execute_timing: true,
            ..StubEngine::succeeding()
        };
        let runtime = SqlRuntime::new(client, Arc::new(engine));

        let err = runtime.run(&pending_run()).await.unwrap_err();
        assert!(err.to_string().contains("incomplete timing"));
    }

    #[tokio::test]
    async fn test_transform_missing_input() {
        let client = Arc::new(LocalClient::new());
        let runtime = SqlRuntime::new(client, Arc::new(StubEngine::succeeding()));

        let err = runtime.run(&pending_run()).await.unwrap_err();
        assert!(err.to_string().contains("'t1' not found"));
    }

    #[tokio::test]
    async fn test_run_requires_pending_state() {
        let client = client_with_input().await;
        let runtime = SqlRuntime::new(client, Arc::new(StubEngine::succeeding()));

        let mut run = pending_run();
        run.status = RunStatus::default();
        let err = runtime.run(&run).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Core(CoreError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_run_rejects_unsupported_task() {
        let client = client_with_input().await;
        let runtime = SqlRuntime::new(client, Arc::new(StubEngine::succeeding()));

        let mut run = pending_run();
        run.spec.task = "transform+profile://ns/myfn:f1".to_string();
        let err = runtime.run(&run).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UnsupportedTask { task, .. } if task == "profile"
        ));
    }

    #[tokio::test]
    async fn test_transform_rejects_non_list_inputs() {
        let client = client_with_input().await;
        let runtime = SqlRuntime::new(client, Arc::new(StubEngine::succeeding()));

        let mut run = pending_run();
        run.spec.inputs = Some(json!({"dataitems": ["t1"]}));
        let err = runtime.run(&run).await.unwrap_err();
        assert!(err.to_string().contains("inputs must be a list"));
    }
}
