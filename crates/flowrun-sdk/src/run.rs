//! The Run entity and its execution protocol.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::{error, info};

use flowrun_client::{api, entities, ClientError};
use flowrun_core::{
    Artifact, CoreError, Dataitem, Function, ResultRef, RunDocument, RunId, RunMetadata, RunSpec,
    RunStatus, State, Task, TaskId, TaskReference,
};

use crate::context::Context;
use crate::error::Error;

/// One concrete execution attempt of a Task.
///
/// A run is created in memory, `build` resolves its Function and Task
/// and merges their specs, `execute` hands it to the resolved runtime
/// and records the outcome. Every step persists the run through the
/// backend client, unless the run is local-only.
pub struct Run {
    ctx: Context,
    doc: RunDocument,
    /// Local-only run: never persisted, no backend identity.
    local: bool,
    /// Whether the run already exists in the backend.
    persisted: bool,
}

impl Run {
    /// Create a new run bound to a task.
    pub fn new(
        ctx: &Context,
        task: impl Into<String>,
        task_id: TaskId,
        kind: impl Into<String>,
    ) -> Self {
        let spec = RunSpec::new(task, task_id);
        let doc = RunDocument::new(ctx.project(), kind, spec);
        Self {
            ctx: ctx.clone(),
            doc,
            local: false,
            persisted: false,
        }
    }

    /// Builder method to set a specific id (useful for testing).
    pub fn with_id(mut self, id: RunId) -> Self {
        self.doc.metadata.name = id.as_str().to_string();
        self.doc.id = id;
        self
    }

    /// Builder method to set the named inputs.
    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.doc.spec.inputs = Some(inputs);
        self
    }

    /// Builder method to set the named outputs.
    pub fn with_outputs(mut self, outputs: Value) -> Self {
        self.doc.spec.outputs = Some(outputs);
        self
    }

    /// Builder method to set execution parameters.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.doc.spec.parameters = Some(parameters);
        self
    }

    /// Builder method to request in-process execution.
    pub fn with_local_execution(mut self, local_execution: bool) -> Self {
        self.doc.spec.local_execution = local_execution;
        self
    }

    /// Builder method to mark the run local-only (never persisted).
    pub fn with_local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    /// Builder method to set metadata labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.doc.metadata.labels = Some(labels);
        self
    }

    /// Builder method to record where the run was imported from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.doc.metadata.source = Some(source.into());
        self
    }

    /// Run id.
    pub fn id(&self) -> &RunId {
        &self.doc.id
    }

    /// Run kind.
    pub fn kind(&self) -> &str {
        &self.doc.kind
    }

    /// Project the run belongs to.
    pub fn project(&self) -> &str {
        &self.doc.project
    }

    /// Run metadata.
    pub fn metadata(&self) -> &RunMetadata {
        &self.doc.metadata
    }

    /// Run spec.
    pub fn spec(&self) -> &RunSpec {
        &self.doc.spec
    }

    /// Run status.
    pub fn status(&self) -> &RunStatus {
        &self.doc.status
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.doc.state()
    }

    /// The persisted representation of the run.
    pub fn document(&self) -> &RunDocument {
        &self.doc
    }

    /// Build the run: resolve its Function and Task, merge their specs
    /// into the run spec, and land in the pending state.
    ///
    /// Task/run-level overrides customize the function's declared
    /// defaults without mutating the Function itself.
    pub async fn build(&mut self) -> Result<(), Error> {
        self.doc.ensure_can_build()?;
        let reference = self.doc.spec.task_reference()?;
        info!(
            run_id = %self.doc.id,
            function = %reference.function_name,
            task_kind = %reference.task_kind,
            "Building run"
        );

        let function = self.fetch_function(&reference).await?;
        let task = self.fetch_task(&reference).await?;
        let runtime = self.ctx.registry().resolve(&reference.function_kind)?;

        let merged = runtime.build(&function, &task, &self.doc)?;
        // The merged shape is already kind-consistent, so it replaces
        // the spec without re-validation.
        self.doc.spec = RunSpec::from_map(merged)?;
        self.doc.status = RunStatus::with_state(State::Pending);
        self.save().await?;
        Ok(())
    }

    /// Execute the run through its runtime.
    ///
    /// Runtime failures never propagate: they are converted into a
    /// persisted terminal ERROR status, so a failed job is always
    /// observable as a queryable state.
    pub async fn execute(&mut self) -> Result<(), Error> {
        self.doc.ensure_can_execute()?;
        let reference = self.doc.spec.task_reference()?;
        let runtime = self.ctx.registry().resolve(&reference.function_kind)?;

        if self.doc.spec.local_execution {
            self.doc.status = RunStatus::with_state(State::Running);
            self.save().await?;
        }

        info!(run_id = %self.doc.id, runtime = runtime.name(), "Executing run");
        match runtime.run(&self.doc).await {
            Ok(payload) => {
                if let Err(err) = self.doc.set_status(payload) {
                    error!(run_id = %self.doc.id, error = ?err, "Runtime returned an invalid status");
                    self.doc.status = RunStatus::error(err.to_string());
                }
            }
            Err(err) => {
                // Log the original error class before the lossy string
                // conversion below.
                error!(run_id = %self.doc.id, error = ?err, "Run execution failed");
                self.doc.status = RunStatus::error(err.to_string());
            }
        }
        self.save().await?;
        Ok(())
    }

    /// Persist the run (create-or-update by id).
    pub async fn save(&mut self) -> Result<(), Error> {
        if self.local {
            return Ok(());
        }
        if self.persisted {
            self.doc.metadata.touch();
            let value = self.doc.to_value()?;
            self.ctx
                .client()
                .update_object(&api::run(self.doc.id.as_str()), value)
                .await?;
        } else {
            let value = self.doc.to_value()?;
            self.ctx.client().create_object(&api::runs(), value).await?;
            self.persisted = true;
        }
        Ok(())
    }

    /// Re-read the run from the backend, replacing everything but its
    /// identity.
    pub async fn refresh(&mut self) -> Result<Value, Error> {
        if self.local {
            return Err(ClientError::LocalMode.into());
        }
        let value = self
            .ctx
            .client()
            .read_object(&api::run(self.doc.id.as_str()))
            .await?;
        let refreshed = RunDocument::from_value(value.clone())?;
        self.doc.kind = refreshed.kind;
        self.doc.metadata = refreshed.metadata;
        self.doc.spec = refreshed.spec;
        self.doc.status = refreshed.status;
        self.persisted = true;
        Ok(value)
    }

    /// Fetch the run's execution logs from the backend.
    pub async fn logs(&self) -> Result<Value, Error> {
        if self.local {
            return Ok(json!({}));
        }
        Ok(self
            .ctx
            .client()
            .read_object(&api::run_logs(self.doc.id.as_str()))
            .await?)
    }

    /// All dataitems produced by the run.
    pub async fn get_dataitems(&mut self) -> Result<Vec<Dataitem>, Error> {
        let refs = self.result_refs(false).await?;
        let mut items = Vec::with_capacity(refs.len());
        for entry in &refs {
            items.push(entities::get_dataitem_from_key(self.ctx.client(), &entry.id).await?);
        }
        Ok(items)
    }

    /// The dataitem produced under an output key.
    pub async fn get_dataitem(&mut self, key: &str) -> Result<Dataitem, Error> {
        let refs = self.result_refs(false).await?;
        let entry = find_ref(&refs, "dataitem", key)?;
        Ok(entities::get_dataitem_from_key(self.ctx.client(), &entry.id).await?)
    }

    /// All artifacts produced by the run.
    pub async fn get_artifacts(&mut self) -> Result<Vec<Artifact>, Error> {
        let refs = self.result_refs(true).await?;
        let mut items = Vec::with_capacity(refs.len());
        for entry in &refs {
            items.push(entities::get_artifact_from_key(self.ctx.client(), &entry.id).await?);
        }
        Ok(items)
    }

    /// The artifact produced under an output key.
    pub async fn get_artifact(&mut self, key: &str) -> Result<Artifact, Error> {
        let refs = self.result_refs(true).await?;
        let entry = find_ref(&refs, "artifact", key)?;
        Ok(entities::get_artifact_from_key(self.ctx.client(), &entry.id).await?)
    }

    /// Stop the run.
    ///
    /// Not implemented by this core: a cancellation protocol needs a
    /// runtime-side abort hook that does not exist yet.
    pub fn stop(&self) -> Result<(), Error> {
        Err(CoreError::NotSupported("run cancellation".to_string()).into())
    }

    /// Export the run as a YAML file under the project directory.
    pub fn export(&self, filename: Option<&str>) -> Result<PathBuf, Error> {
        let yaml = serde_yaml::to_string(&self.doc)?;
        let filename = match filename {
            Some(name) => name.to_string(),
            None => format!(
                "{}_{}_{}.yml",
                self.doc.kind, self.doc.metadata.name, self.doc.id
            ),
        };
        let path = Path::new(&self.doc.project).join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, yaml)?;
        Ok(path)
    }

    /// Serialize the run into its backend representation.
    pub fn to_value(&self) -> Result<Value, Error> {
        Ok(self.doc.to_value()?)
    }

    /// Load a run from its backend representation.
    pub fn from_value(ctx: &Context, value: Value) -> Result<Self, Error> {
        let doc = RunDocument::from_value(value)?;
        Ok(Self {
            ctx: ctx.clone(),
            doc,
            local: false,
            persisted: true,
        })
    }

    async fn result_refs(&mut self, artifacts: bool) -> Result<Vec<ResultRef>, Error> {
        self.refresh().await?;
        let refs = if artifacts {
            self.doc.status.artifacts.clone()
        } else {
            self.doc.status.dataitems.clone()
        };
        refs.ok_or_else(|| CoreError::NoResult.into())
    }

    async fn fetch_function(&self, reference: &TaskReference) -> Result<Function, Error> {
        let value = self
            .ctx
            .client()
            .read_object(&api::function(
                &self.doc.project,
                &reference.function_name,
                &reference.function_id,
            ))
            .await?;
        Ok(serde_json::from_value(value).map_err(|e| CoreError::Serialization(e.to_string()))?)
    }

    async fn fetch_task(&self, reference: &TaskReference) -> Result<Task, Error> {
        let value = self
            .ctx
            .client()
            .read_object(&api::task(reference.task_id.as_str()))
            .await?;
        Ok(serde_json::from_value(value).map_err(|e| CoreError::Serialization(e.to_string()))?)
    }
}

fn find_ref<'a>(refs: &'a [ResultRef], entity: &str, key: &str) -> Result<&'a ResultRef, Error> {
    refs.iter().find(|r| r.key == key).ok_or_else(|| {
        CoreError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
        .into()
    })
}
