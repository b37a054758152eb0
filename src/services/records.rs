//! Typed access to the document store, shared by the CRUD services.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::storage::{Collection, Document, DocumentStore, Query, document_id, from_document};

/// Wraps a store with record (de)serialization and failure logging.
#[derive(Clone)]
pub(crate) struct Records {
    store: Arc<dyn DocumentStore>,
}

impl Records {
    pub(crate) fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn create<T: DeserializeOwned>(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<T> {
        let stored = self
            .store
            .create(collection, document)
            .await
            .inspect_err(|e| log::error!("Failed to create {}: {}", collection.name(), e))?;
        from_document(stored)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, collection: Collection, id: &str) -> Result<T> {
        let document = self
            .store
            .get(collection, id)
            .await
            .inspect_err(|e| log_failure("load", collection, e))?;
        from_document(document)
    }

    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Vec<T>> {
        let documents = self
            .store
            .list(collection, query)
            .await
            .inspect_err(|e| log::error!("Failed to list {}: {}", collection.name(), e))?;
        documents.into_iter().map(from_document::<T>).collect()
    }

    pub(crate) async fn update<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> Result<T> {
        let document = self
            .store
            .update(collection, id, patch)
            .await
            .inspect_err(|e| log_failure("update", collection, e))?;
        from_document(document)
    }

    pub(crate) async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.store
            .delete(collection, id)
            .await
            .inspect_err(|e| log_failure("delete", collection, e))
    }

    /// Delete every document whose `field` equals `value`. Returns how many went.
    pub(crate) async fn delete_where(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<usize> {
        let query = Query::new().equal(field, Value::String(value.to_string()));
        let documents = self.store.list(collection, &query).await?;

        let mut deleted = 0;
        for id in documents.iter().filter_map(document_id) {
            self.delete(collection, id).await?;
            deleted += 1;
        }
        Ok(deleted)
    }
}

/// Missing records are expected traffic; everything else is an error.
fn log_failure(action: &str, collection: Collection, error: &AppError) {
    if error.is_not_found() {
        log::debug!("Failed to {} {}: {}", action, collection.name(), error);
    } else {
        log::error!("Failed to {} {}: {}", action, collection.name(), error);
    }
}
