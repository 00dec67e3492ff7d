use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures_util::TryStreamExt;
use mongodb::{Client, Database};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Hard cap on the number of documents a text search may return.
pub const SEARCH_RESULT_LIMIT: i64 = 20;

/// Collection
///
/// The explicit entity-to-collection mapping. Every store operation names its
/// target through this table rather than deriving the collection name from a
/// type name, so renaming a Rust type can never silently re-point reads and
/// writes at a fresh, empty collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Poi,
    LoreArticle,
    Category,
    MapAsset,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Poi => "poi",
            Collection::LoreArticle => "lorearticle",
            Collection::Category => "category",
            Collection::MapAsset => "mapasset",
        }
    }
}

/// StoreError
///
/// Failure modes of the document store. Connection errors surface at startup
/// or when MongoDB becomes unreachable; query errors cover everything the
/// driver reports per operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("database operation failed: {0}")]
    Query(String),
}

/// DocumentStore
///
/// Abstract contract for all persistence operations, shared across handlers as
/// a trait object. Handlers validate payloads before calling in; the store
/// performs exactly one operation per call with no transactions, retries, or
/// locking. Concurrent writers to the same record race (last write wins),
/// which is acceptable for a single-admin tool and deliberately not "fixed"
/// here.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document and returns its newly assigned id.
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError>;

    /// Returns every document in the collection in insertion order,
    /// fully materialized. No pagination, no filtering.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Finds a single document matching `filter`, optionally sorted first
    /// (e.g. `{"version": -1}` for latest-version queries).
    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>, StoreError>;

    /// Merges the provided fields into the document with the given id.
    /// Callers must not invoke this with an empty field set; the empty-update
    /// short-circuit happens at the API layer before the store is touched.
    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<(), StoreError>;

    /// Removes the document with the given id. Idempotent: deleting a missing
    /// id is a successful no-op.
    async fn delete_one(&self, collection: Collection, id: ObjectId) -> Result<(), StoreError>;

    /// Case-insensitive substring match across the named string fields,
    /// capped at [`SEARCH_RESULT_LIMIT`], in the store's natural order.
    async fn search(
        &self,
        collection: Collection,
        fields: &[&str],
        query: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Names of the collections currently present. Feeds the /test diagnostic.
    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the document store across the application state.
pub type StoreState = Arc<dyn DocumentStore>;

/// MongoStore
///
/// The real implementation, backed by the MongoDB driver. One `Database`
/// handle is shared by all requests for the lifetime of the process.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// connect
    ///
    /// Builds the client and verifies the connection with a ping. A short
    /// server-selection timeout is appended to the URI so startup fails fast
    /// instead of hanging when MongoDB is unreachable.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to MongoDB database '{}'", db_name);

        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(format!("MongoDB ping failed: {e}")))?;

        tracing::info!("MongoDB connection established");
        Ok(Self { db })
    }

    fn coll(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let result = self
            .coll(collection)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Query("insert did not return an ObjectId".to_string()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .coll(collection)
            .find(doc! {})
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let coll = self.coll(collection);
        let mut op = coll.find_one(filter);
        if let Some(sort) = sort {
            op = op.sort(sort);
        }
        op.await.map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<(), StoreError> {
        self.coll(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn delete_one(&self, collection: Collection, id: ObjectId) -> Result<(), StoreError> {
        // deleted_count is intentionally ignored: a missing id is a success.
        self.coll(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn search(
        &self,
        collection: Collection,
        fields: &[&str],
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let clauses: Vec<Document> = fields
            .iter()
            .map(|field| doc! { *field: { "$regex": query, "$options": "i" } })
            .collect();

        let cursor = self
            .coll(collection)
            .find(doc! { "$or": clauses })
            .limit(SEARCH_RESULT_LIMIT)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        self.db
            .list_collection_names()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

/// MemoryStore
///
/// In-process implementation of `DocumentStore` used by the test suite. It
/// mirrors the observable semantics of `MongoStore` (insertion order, id
/// assignment, merge updates, idempotent deletes, capped case-insensitive
/// search) without requiring a running database.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<&'static str, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Numeric sort key for the in-memory `find_one` sort. Non-numeric and
/// missing fields sort last in descending order.
fn sort_key(document: &Document, field: &str) -> f64 {
    match document.get(field) {
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => f64::NEG_INFINITY,
    }
}

fn matches(filter: &Document, document: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        let mut stored = doc! { "_id": id };
        stored.extend(document);

        let mut collections = self.collections.lock().expect("store lock poisoned");
        collections.entry(collection.name()).or_default().push(stored);
        Ok(id)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.lock().expect("store lock poisoned");
        Ok(collections.get(collection.name()).cloned().unwrap_or_default())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.lock().expect("store lock poisoned");
        let empty = Vec::new();
        let docs = collections.get(collection.name()).unwrap_or(&empty);

        let mut candidates: Vec<&Document> =
            docs.iter().filter(|d| matches(&filter, d)).collect();

        if let Some(sort) = sort {
            if let Some((field, direction)) = sort.iter().next() {
                let descending = matches!(direction, Bson::Int32(v) if *v < 0)
                    || matches!(direction, Bson::Int64(v) if *v < 0);
                candidates.sort_by(|a, b| {
                    let ordering = sort_key(a, field).total_cmp(&sort_key(b, field));
                    if descending { ordering.reverse() } else { ordering }
                });
            }
        }

        Ok(candidates.first().map(|d| (*d).clone()))
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: ObjectId,
        fields: Document,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().expect("store lock poisoned");
        if let Some(docs) = collections.get_mut(collection.name()) {
            if let Some(target) = docs
                .iter_mut()
                .find(|d| d.get_object_id("_id").ok() == Some(id))
            {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
        }
        Ok(())
    }

    async fn delete_one(&self, collection: Collection, id: ObjectId) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().expect("store lock poisoned");
        if let Some(docs) = collections.get_mut(collection.name()) {
            docs.retain(|d| d.get_object_id("_id").ok() != Some(id));
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: Collection,
        fields: &[&str],
        query: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let needle = query.to_lowercase();
        let collections = self.collections.lock().expect("store lock poisoned");
        let empty = Vec::new();
        let docs = collections.get(collection.name()).unwrap_or(&empty);

        Ok(docs
            .iter()
            .filter(|d| {
                fields.iter().any(|field| {
                    d.get_str(field)
                        .map(|value| value.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            })
            .take(SEARCH_RESULT_LIMIT as usize)
            .cloned()
            .collect())
    }

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.lock().expect("store lock poisoned");
        Ok(collections.keys().map(|name| name.to_string()).collect())
    }
}
