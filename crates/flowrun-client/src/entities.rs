//! Entity lookup and creation through the backend.
//!
//! Thin helpers resolving dataitems and artifacts for the run protocol;
//! the documents themselves are defined in `flowrun-core`.

use serde_json::Value;
use tracing::debug;

use flowrun_core::{Artifact, Dataitem, StoreKey};

use crate::api;
use crate::error::ClientError;
use crate::BackendClient;

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Serialization(e.to_string()))
}

/// Fetch the latest revision of a dataitem by name.
pub async fn get_dataitem(
    client: &dyn BackendClient,
    project: &str,
    name: &str,
) -> Result<Dataitem, ClientError> {
    let value = client.read_object(&api::dataitem(project, name)).await?;
    decode(value)
}

/// Resolve a dataitem from the store key recorded in a run result.
pub async fn get_dataitem_from_key(
    client: &dyn BackendClient,
    key: &str,
) -> Result<Dataitem, ClientError> {
    let key = StoreKey::parse(key).map_err(|e| ClientError::InvalidKey(e.to_string()))?;
    let value = client
        .read_object(&api::dataitem_version(&key.project, &key.name, &key.id))
        .await?;
    decode(value)
}

/// Register a new dataitem revision in the backend.
pub async fn new_dataitem(
    client: &dyn BackendClient,
    dataitem: Dataitem,
) -> Result<Dataitem, ClientError> {
    debug!(
        project = %dataitem.project,
        name = %dataitem.name,
        revision = %dataitem.id,
        "Registering dataitem"
    );
    let path = api::dataitem(&dataitem.project, &dataitem.name);
    let payload =
        serde_json::to_value(&dataitem).map_err(|e| ClientError::Serialization(e.to_string()))?;
    let stored = client.create_object(&path, payload).await?;
    decode(stored)
}

/// Resolve an artifact from the store key recorded in a run result.
pub async fn get_artifact_from_key(
    client: &dyn BackendClient,
    key: &str,
) -> Result<Artifact, ClientError> {
    let key = StoreKey::parse(key).map_err(|e| ClientError::InvalidKey(e.to_string()))?;
    let value = client
        .read_object(&api::artifact_version(&key.project, &key.name, &key.id))
        .await?;
    decode(value)
}

/// Fetch the latest version of an artifact by name.
pub async fn get_artifact(
    client: &dyn BackendClient,
    project: &str,
    name: &str,
) -> Result<Artifact, ClientError> {
    let value = client.read_object(&api::artifact(project, name)).await?;
    decode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalClient;
    use flowrun_core::RevisionId;
    use serde_json::json;

    #[tokio::test]
    async fn test_dataitem_round_trip() {
        let client = LocalClient::new();
        let dataitem = Dataitem::new("proj", "t1", "sql", RevisionId::new("v1"))
            .with_path("sql://postgres/db/schema/t1_vv1");

        let stored = new_dataitem(&client, dataitem.clone()).await.unwrap();
        assert_eq!(stored, dataitem);

        let latest = get_dataitem(&client, "proj", "t1").await.unwrap();
        assert_eq!(latest.id, RevisionId::new("v1"));

        let by_key = get_dataitem_from_key(&client, &dataitem.store_key().to_string())
            .await
            .unwrap();
        assert_eq!(by_key, dataitem);
    }

    #[tokio::test]
    async fn test_dataitem_from_bad_key() {
        let client = LocalClient::new();
        let err = get_dataitem_from_key(&client, "not-a-key").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_artifact_from_key() {
        let client = LocalClient::new();
        client
            .create_object(
                "/api/v1/projects/proj/artifacts/report",
                json!({"id": "a1", "name": "report", "kind": "file", "project": "proj"}),
            )
            .await
            .unwrap();

        let artifact = get_artifact_from_key(&client, "store://proj/artifacts/file/report:a1")
            .await
            .unwrap();
        assert_eq!(artifact.id, "a1");
        assert_eq!(artifact.kind, "file");
    }
}
