//! Local filesystem document store.
//!
//! Stands in for the hosted backend during development and for the CLI.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/{project_id}/{database_id}/
//! ├── users.json
//! ├── trips.json
//! ├── activities.json
//! ├── expenses.json
//! ├── itinerary.json
//! └── shared-trips.json
//! ```
//!
//! Each file holds a JSON array of documents. Writes go through a temp file
//! and a rename, and a store-wide lock serializes read-modify-write cycles.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{BackendConfig, CollectionIds};
use crate::storage::{Collection, Document, DocumentStore, Query, document_id};

/// Local filesystem storage backend.
pub struct LocalStore {
    root_dir: PathBuf,
    collections: CollectionIds,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, collections: CollectionIds) -> Self {
        Self {
            root_dir: root_dir.into(),
            collections,
            lock: Mutex::new(()),
        }
    }

    /// Create a LocalStore for the configured project and database.
    pub fn from_config(backend: &BackendConfig) -> Self {
        Self::new(backend.database_dir(), backend.collections.clone())
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the file path for a collection.
    fn path(&self, collection: Collection) -> PathBuf {
        self.root_dir
            .join(format!("{}.json", self.collections.id(collection)))
    }

    /// Read every document of a collection; a missing file is an empty collection.
    async fn read_collection(&self, collection: Collection) -> Result<Vec<Document>> {
        let path = self.path(collection);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write a collection atomically (write to temp, then rename).
    async fn write_collection(&self, collection: Collection, documents: &[Document]) -> Result<()> {
        let path = self.path(collection);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(documents)?;
        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    fn not_found(&self, collection: Collection, id: &str) -> AppError {
        AppError::not_found(collection.name(), id)
    }
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn create(&self, collection: Collection, mut document: Document) -> Result<Document> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_collection(collection).await?;

        let id = match document_id(&document) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        if documents.iter().any(|d| document_id(d) == Some(id.as_str())) {
            return Err(AppError::validation(format!(
                "{} '{}' already exists",
                collection.name(),
                id
            )));
        }

        let now = timestamp();
        document.insert("id".into(), Value::String(id.clone()));
        document.entry("createdAt").or_insert_with(|| now.clone());
        document.insert("updatedAt".into(), now);

        documents.push(document.clone());
        self.write_collection(collection, &documents).await?;

        log::debug!("Created {} '{}'", collection.name(), id);
        Ok(document)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Document> {
        let _guard = self.lock.lock().await;
        self.read_collection(collection)
            .await?
            .into_iter()
            .find(|d| document_id(d) == Some(id))
            .ok_or_else(|| self.not_found(collection, id))
    }

    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let _guard = self.lock.lock().await;
        let documents = self.read_collection(collection).await?;
        Ok(query.apply(documents))
    }

    async fn update(&self, collection: Collection, id: &str, patch: Document) -> Result<Document> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_collection(collection).await?;

        let document = documents
            .iter_mut()
            .find(|d| document_id(d) == Some(id))
            .ok_or_else(|| self.not_found(collection, id))?;

        for (key, value) in patch {
            if matches!(key.as_str(), "id" | "createdAt" | "updatedAt") {
                continue;
            }
            document.insert(key, value);
        }
        document.insert("updatedAt".into(), timestamp());
        let updated = document.clone();

        self.write_collection(collection, &documents).await?;

        log::debug!("Updated {} '{}'", collection.name(), id);
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_collection(collection).await?;

        let before = documents.len();
        documents.retain(|d| document_id(d) != Some(id));
        if documents.len() == before {
            return Err(self.not_found(collection, id));
        }

        self.write_collection(collection, &documents).await?;

        log::debug!("Deleted {} '{}'", collection.name(), id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn store(dir: &TempDir) -> LocalStore {
        LocalStore::new(dir.path().join("db"), CollectionIds::default())
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let created = store
            .create(Collection::Trips, doc(json!({ "title": "Rome" })))
            .await
            .unwrap();

        let id = document_id(&created).unwrap().to_string();
        assert!(!id.is_empty());
        assert!(created.contains_key("createdAt"));
        assert!(created.contains_key("updatedAt"));

        let fetched = store.get(Collection::Trips, &id).await.unwrap();
        assert_eq!(fetched, created);
        assert!(dir.path().join("db/trips.json").exists());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store
            .create(Collection::Users, doc(json!({ "id": "u1" })))
            .await
            .unwrap();
        let second = store
            .create(Collection::Users, doc(json!({ "id": "u1" })))
            .await;
        assert!(matches!(second, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_merges_and_protects_id() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let created = store
            .create(
                Collection::Trips,
                doc(json!({ "id": "t1", "title": "Rome", "budget": 100.0 })),
            )
            .await
            .unwrap();

        let updated = store
            .update(
                Collection::Trips,
                "t1",
                doc(json!({ "id": "other", "budget": 250.0 })),
            )
            .await
            .unwrap();

        assert_eq!(updated["id"], json!("t1"));
        assert_eq!(updated["title"], json!("Rome"));
        assert_eq!(updated["budget"], json!(250.0));
        assert_eq!(updated["createdAt"], created["createdAt"]);
    }

    #[tokio::test]
    async fn test_missing_documents_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.get(Collection::Trips, "nope").await.unwrap_err().is_not_found());
        assert!(store.delete(Collection::Trips, "nope").await.unwrap_err().is_not_found());
        assert!(
            store
                .update(Collection::Trips, "nope", Document::new())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        for (id, trip) in [("a1", "t1"), ("a2", "t2"), ("a3", "t1")] {
            store
                .create(Collection::Activities, doc(json!({ "id": id, "tripId": trip })))
                .await
                .unwrap();
        }

        let query = Query::new().equal("tripId", "t1");
        assert_eq!(store.list(Collection::Activities, &query).await.unwrap().len(), 2);

        store.delete(Collection::Activities, "a1").await.unwrap();
        let remaining = store.list(Collection::Activities, &query).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(document_id(&remaining[0]), Some("a3"));
    }

    #[tokio::test]
    async fn test_custom_collection_ids() {
        let dir = TempDir::new().unwrap();
        let collections = CollectionIds {
            shared_trips: "shares".into(),
            ..CollectionIds::default()
        };
        let store = LocalStore::new(dir.path(), collections);

        store
            .create(Collection::SharedTrips, doc(json!({ "tripId": "t1" })))
            .await
            .unwrap();
        assert!(dir.path().join("shares.json").exists());
    }
}
