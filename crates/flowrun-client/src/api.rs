//! Backend API path construction.
//!
//! All paths the client touches are built here, so the path layout is
//! changed in one place.

/// API version prefix.
pub const API_BASE: &str = "/api/v1";

/// Collection path for runs.
pub fn runs() -> String {
    format!("{API_BASE}/runs")
}

/// Path for a single run.
pub fn run(id: &str) -> String {
    format!("{API_BASE}/runs/{id}")
}

/// Path for a run's execution logs.
pub fn run_logs(id: &str) -> String {
    format!("{API_BASE}/runs/{id}/log")
}

/// Path for a single task.
pub fn task(id: &str) -> String {
    format!("{API_BASE}/tasks/{id}")
}

/// Path for a function at a specific id.
pub fn function(project: &str, name: &str, id: &str) -> String {
    format!("{API_BASE}/projects/{project}/functions/{name}/{id}")
}

/// Path for the latest revision of a dataitem.
///
/// Doubles as the collection path new revisions are created under.
pub fn dataitem(project: &str, name: &str) -> String {
    format!("{API_BASE}/projects/{project}/dataitems/{name}")
}

/// Path for a specific revision of a dataitem.
pub fn dataitem_version(project: &str, name: &str, id: &str) -> String {
    format!("{API_BASE}/projects/{project}/dataitems/{name}/{id}")
}

/// Path for the latest version of an artifact.
pub fn artifact(project: &str, name: &str) -> String {
    format!("{API_BASE}/projects/{project}/artifacts/{name}")
}

/// Path for a specific version of an artifact.
pub fn artifact_version(project: &str, name: &str, id: &str) -> String {
    format!("{API_BASE}/projects/{project}/artifacts/{name}/{id}")
}
