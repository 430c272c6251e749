//! End-to-end transform flow: build, execute and result retrieval
//! against the SQL runtime with a stubbed engine.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use flowrun_runtime_sql::{
    EngineError, EngineProject, EngineRunResult, InputModel, PhaseTiming, SqlEngine, SqlRuntime,
};
use flowrun_sdk::{
    BackendClient, Context, Dataitem, LocalClient, Run, RuntimeRegistry, State, TaskId,
};

/// Engine stub that succeeds or fails depending on configuration.
struct StubEngine {
    succeed: bool,
}

#[async_trait]
impl SqlEngine for StubEngine {
    async fn materialize(
        &self,
        _input: &InputModel,
        _dataitem: &Dataitem,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    async fn execute(&self, project: &EngineProject) -> Result<EngineRunResult, EngineError> {
        let now = Utc::now();
        let timing = |name: &str| PhaseTiming {
            name: name.to_string(),
            started_at: Some(now),
            completed_at: Some(now),
        };
        Ok(EngineRunResult {
            status: if self.succeed { "success" } else { "error" }.to_string(),
            package_name: project.project.replace('-', "_"),
            node_name: project.output.name.clone(),
            relation_name: format!("\"db\".\"schema\".\"{}\"", project.output.table()),
            raw_code: project.sql.clone(),
            compiled_code: project.sql.clone(),
            timing: vec![timing("compile"), timing("execute")],
        })
    }
}

async fn context(succeed: bool) -> Context {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();

    let client = Arc::new(LocalClient::new());
    client
        .create_object(
            "/api/v1/projects/ns/functions/myfn",
            json!({
                "id": "f1",
                "name": "myfn",
                "kind": "transform",
                "project": "ns",
                "spec": {"sql": "select * from t1"},
            }),
        )
        .await
        .unwrap();
    client
        .create_object(
            "/api/v1/tasks",
            json!({
                "id": "t-1",
                "kind": "transform",
                "project": "ns",
                "spec": {},
            }),
        )
        .await
        .unwrap();
    client
        .create_object(
            "/api/v1/projects/ns/dataitems/t1",
            json!({
                "id": "rev1",
                "name": "t1",
                "kind": "sql",
                "project": "ns",
            }),
        )
        .await
        .unwrap();

    let backend: Arc<dyn BackendClient> = client;
    let engine = Arc::new(StubEngine { succeed });
    let registry = RuntimeRegistry::builder()
        .register("transform", {
            let backend = backend.clone();
            move || Arc::new(SqlRuntime::new(backend.clone(), engine.clone()))
        })
        .unwrap()
        .build();

    Context::new("ns", backend, Arc::new(registry))
}

fn transform_run(ctx: &Context) -> Run {
    Run::new(
        ctx,
        "transform+transform://ns/myfn:f1",
        TaskId::new("t-1"),
        "run",
    )
    .with_inputs(json!(["t1"]))
    .with_outputs(json!(["t2"]))
    .with_local_execution(true)
}

#[tokio::test]
async fn test_transform_run_completes() {
    let ctx = context(true).await;
    let mut run = transform_run(&ctx);

    run.build().await.unwrap();
    assert_eq!(run.state(), State::Pending);
    // The function's sql source landed in the merged run spec.
    assert_eq!(run.spec().extra["sql"], "select * from t1");

    run.execute().await.unwrap();
    assert_eq!(run.state(), State::Completed);

    let refs = run.status().dataitems.clone().unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].key, "t2");

    let produced = run.get_dataitem("t2").await.unwrap();
    assert_eq!(produced.name, "t2");
    assert_eq!(produced.kind, "sql");
    assert!(produced
        .path
        .as_deref()
        .unwrap()
        .starts_with("sql://postgres/db/schema/t2_v"));
    assert_eq!(produced.extra["raw_code"], "select * from t1");
}

#[tokio::test]
async fn test_transform_run_records_engine_failure() {
    let ctx = context(false).await;
    let mut run = transform_run(&ctx);

    run.build().await.unwrap();
    run.execute().await.unwrap();

    assert_eq!(run.state(), State::Error);
    let message = run.status().message.as_deref().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("status 'error'"));
}

#[tokio::test]
async fn test_rebuild_after_failure_enables_retry() {
    let ctx = context(false).await;
    let mut run = transform_run(&ctx);

    run.build().await.unwrap();
    run.execute().await.unwrap();
    assert_eq!(run.state(), State::Error);

    // A terminal run can be rebuilt and re-executed.
    run.build().await.unwrap();
    assert_eq!(run.state(), State::Pending);
}
