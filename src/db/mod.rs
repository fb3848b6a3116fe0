pub mod migrations;
pub mod store;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

pub use store::SqliteDocumentStore;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("document {id} not found in {collection}")]
    NotFound { collection: Collection, id: String },

    #[error("store connection lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookings,
    Jobs,
    Applications,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Bookings => "bookings",
            Collection::Jobs => "jobs",
            Collection::Applications => "applications",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderBy {
    pub key: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    pub fn desc(key: &'static str) -> Self {
        Self {
            key,
            direction: Direction::Descending,
        }
    }

    pub fn asc(key: &'static str) -> Self {
        Self {
            key,
            direction: Direction::Ascending,
        }
    }
}

/// A schema-less record as held by the store. The id lives beside the
/// fields, never inside them.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

impl Document {
    /// Decode into a model whose `id` field receives the store-assigned id.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut fields = self.fields;
        if let Some(obj) = fields.as_object_mut() {
            obj.insert("id".to_string(), serde_json::Value::String(self.id));
        }
        Ok(serde_json::from_value(fields)?)
    }
}

/// Serialize a model into stored fields, dropping any `id` key.
pub fn encode_fields<T: Serialize>(model: &T) -> Result<serde_json::Value, StoreError> {
    let mut fields = serde_json::to_value(model)?;
    if let Some(obj) = fields.as_object_mut() {
        obj.remove("id");
    }
    Ok(fields)
}

pub fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(Document::decode).collect()
}

pub type SnapshotCallback = Box<dyn Fn(Vec<Document>) + Send + Sync>;

/// Live feed handle. Dropping it stops delivery; `unsubscribe` additionally
/// waits until the delivery task is gone.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Stop delivery. No callback runs after this returns.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(
        &self,
        collection: Collection,
        fields: serde_json::Value,
    ) -> Result<String, StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), StoreError>;

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    async fn list_ordered(
        &self,
        collection: Collection,
        order: OrderBy,
    ) -> Result<Vec<Document>, StoreError>;

    /// Deliver the full ordered snapshot now and again after every change to
    /// `collection`, until the returned handle is dropped or unsubscribed.
    async fn subscribe(
        &self,
        collection: Collection,
        order: OrderBy,
        on_change: SnapshotCallback,
    ) -> Result<Subscription, StoreError>;
}

pub type SharedStore = Arc<dyn DocumentStore>;
