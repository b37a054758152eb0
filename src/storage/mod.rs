//! Storage abstractions for trip planning records.
//!
//! Records live in named document collections, mirroring the hosted backend
//! the UI talks to:
//!
//! ```text
//! users         # Profiles
//! trips         # Trips owned by a user
//! activities    # Children of a trip (tripId)
//! expenses      # Children of a trip (tripId)
//! itinerary     # Ordered legs of a trip (tripId, orderIndex)
//! shared-trips  # Share grants by email
//! ```
//!
//! Documents are JSON objects. The store owns `id`, `createdAt` and
//! `updatedAt`; everything else is opaque to it.

pub mod local;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

// Re-export for convenience
pub use local::LocalStore;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Logical collection names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Trips,
    Activities,
    Expenses,
    Itinerary,
    SharedTrips,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Users,
        Collection::Trips,
        Collection::Activities,
        Collection::Expenses,
        Collection::Itinerary,
        Collection::SharedTrips,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Trips => "trips",
            Collection::Activities => "activities",
            Collection::Expenses => "expenses",
            Collection::Itinerary => "itinerary",
            Collection::SharedTrips => "shared-trips",
        }
    }

    /// Suffix of the `TRIPKIT_COLLECTION_*` override variable.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Collection::Users => "USERS",
            Collection::Trips => "TRIPS",
            Collection::Activities => "ACTIVITIES",
            Collection::Expenses => "EXPENSES",
            Collection::Itinerary => "ITINERARY",
            Collection::SharedTrips => "SHARED_TRIPS",
        }
    }
}

/// Trait for document storage backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document. Assigns `id` when absent and stamps timestamps.
    async fn create(&self, collection: Collection, document: Document) -> Result<Document>;

    /// Fetch one document by id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Document>;

    /// List documents matching a query.
    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>>;

    /// Merge the top-level keys of `patch` into a document.
    async fn update(&self, collection: Collection, id: &str, patch: Document) -> Result<Document>;

    /// Remove a document.
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Equality filters, ordering and limit for `DocumentStore::list`.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep documents whose `field` equals `value`.
    pub fn equal(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_asc(mut self, field: impl Into<String>) -> Self {
        self.order = Some((field.into(), false));
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some((field.into(), true));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| document.get(field) == Some(value))
    }

    /// Filter, sort and truncate a set of documents.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut result: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.matches(doc))
            .collect();

        if let Some((field, descending)) = &self.order {
            result.sort_by(|a, b| {
                let ordering = compare_values(a.get(field), b.get(field));
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }
        result
    }
}

/// Missing values sort first; numbers compare numerically, strings lexically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Serialize a record into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::validation(format!(
            "expected an object, got {other}"
        ))),
    }
}

/// Deserialize a document into a record.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Read the `id` of a stored document.
pub fn document_id(document: &Document) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}
