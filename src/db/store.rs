use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::{
    Collection, Document, DocumentStore, OrderBy, SnapshotCallback, StoreError, Subscription,
};

/// Document store backed by a single SQLite table of JSON bodies.
/// Every committed write is announced on a broadcast channel so live
/// subscriptions can re-read their collection.
pub struct SqliteDocumentStore {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<Collection>,
}

impl SqliteDocumentStore {
    pub fn new(conn: Connection) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(super::init_db(path)?))
    }

    fn announce(&self, collection: Collection) {
        // No receivers is fine
        let _ = self.changes.send(collection);
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| StoreError::Poisoned)
}

fn read_ordered(
    conn: &Connection,
    collection: Collection,
    order: OrderBy,
) -> Result<Vec<Document>, StoreError> {
    let dir = order.direction.as_sql();
    let sql = format!(
        "SELECT id, body FROM documents WHERE collection = ?1
         ORDER BY json_extract(body, ?2) {dir}, rowid {dir}"
    );
    let path = format!("$.{}", order.key);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![collection.as_str(), path], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut docs = vec![];
    for row in rows {
        let (id, body) = row?;
        docs.push(Document {
            id,
            fields: serde_json::from_str(&body)?,
        });
    }
    Ok(docs)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(
        &self,
        collection: Collection,
        fields: serde_json::Value,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let body = serde_json::to_string(&fields)?;

        {
            let conn = lock(&self.conn)?;
            conn.execute(
                "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.as_str(), id, body],
            )?;
        }

        self.announce(collection);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let conn = lock(&self.conn)?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(Document {
                id: id.to_string(),
                fields: serde_json::from_str(&body)?,
            })),
            None => Ok(None),
        }
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: serde_json::Value,
    ) -> Result<(), StoreError> {
        let serde_json::Value::Object(patch) = fields else {
            return Err(StoreError::Serialization(serde::de::Error::custom(
                "partial update must be a JSON object",
            )));
        };

        {
            let conn = lock(&self.conn)?;
            let body: Option<String> = conn
                .query_row(
                    "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                    params![collection.as_str(), id],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(body) = body else {
                return Err(StoreError::NotFound {
                    collection,
                    id: id.to_string(),
                });
            };

            let mut current: serde_json::Value = serde_json::from_str(&body)?;
            if let Some(obj) = current.as_object_mut() {
                for (key, value) in patch {
                    obj.insert(key, value);
                }
            }

            conn.execute(
                "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![serde_json::to_string(&current)?, collection.as_str(), id],
            )?;
        }

        self.announce(collection);
        Ok(())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let removed = {
            let conn = lock(&self.conn)?;
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
            )?
        };

        if removed == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }

        self.announce(collection);
        Ok(())
    }

    async fn list_ordered(
        &self,
        collection: Collection,
        order: OrderBy,
    ) -> Result<Vec<Document>, StoreError> {
        let conn = lock(&self.conn)?;
        read_ordered(&conn, collection, order)
    }

    async fn subscribe(
        &self,
        collection: Collection,
        order: OrderBy,
        on_change: SnapshotCallback,
    ) -> Result<Subscription, StoreError> {
        // Subscribe before the first read so no change slips between them
        let mut rx = self.changes.subscribe();

        let initial = {
            let conn = lock(&self.conn)?;
            read_ordered(&conn, collection, order)?
        };
        on_change(initial);

        let conn = Arc::clone(&self.conn);
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(changed) if changed != collection => continue,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(%collection, skipped, "snapshot listener lagged, re-reading");
                    }
                    Err(RecvError::Closed) => break,
                }

                let snapshot = match lock(&conn) {
                    Ok(conn) => read_ordered(&conn, collection, order),
                    Err(e) => Err(e),
                };

                match snapshot {
                    Ok(docs) => on_change(docs),
                    Err(e) => {
                        tracing::error!(%collection, error = %e, "snapshot listener failed, delivery stopped");
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(task))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::open(":memory:").unwrap()
    }

    fn ids(docs: &[Document]) -> Vec<String> {
        docs.iter().map(|d| d.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = store();
        let id = store
            .create(Collection::Jobs, json!({"title": "Technician", "postedAt": 1}))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let doc = store.get(Collection::Jobs, &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["title"], "Technician");

        // Collections are isolated
        assert!(store.get(Collection::Bookings, &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_both_directions() {
        let store = store();
        let a = store.create(Collection::Jobs, json!({"postedAt": 10})).await.unwrap();
        let b = store.create(Collection::Jobs, json!({"postedAt": 30})).await.unwrap();
        let c = store.create(Collection::Jobs, json!({"postedAt": 20})).await.unwrap();

        let desc = store
            .list_ordered(Collection::Jobs, OrderBy::desc("postedAt"))
            .await
            .unwrap();
        assert_eq!(ids(&desc), vec![b.clone(), c.clone(), a.clone()]);

        let asc = store
            .list_ordered(Collection::Jobs, OrderBy::asc("postedAt"))
            .await
            .unwrap();
        assert_eq!(ids(&asc), vec![a, c, b]);
    }

    #[tokio::test]
    async fn test_equal_keys_newest_first_when_descending() {
        let store = store();
        let first = store.create(Collection::Bookings, json!({"createdAt": 5})).await.unwrap();
        let second = store.create(Collection::Bookings, json!({"createdAt": 5})).await.unwrap();

        let docs = store
            .list_ordered(Collection::Bookings, OrderBy::desc("createdAt"))
            .await
            .unwrap();
        assert_eq!(ids(&docs), vec![second, first]);
    }

    #[tokio::test]
    async fn test_update_fields_merges() {
        let store = store();
        let id = store
            .create(Collection::Bookings, json!({"status": "Pending", "orderId": "BK-1234-567"}))
            .await
            .unwrap();

        store
            .update_fields(Collection::Bookings, &id, json!({"status": "Completed"}))
            .await
            .unwrap();

        let doc = store.get(Collection::Bookings, &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["status"], "Completed");
        assert_eq!(doc.fields["orderId"], "BK-1234-567");
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = store();
        let err = store
            .update_fields(Collection::Bookings, "nope", json!({"status": "Completed"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_twice_passes_error_through() {
        let store = store();
        let id = store.create(Collection::Jobs, json!({"postedAt": 1})).await.unwrap();

        store.delete_document(Collection::Jobs, &id).await.unwrap();
        let err = store.delete_document(Collection::Jobs, &id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_changes() {
        let store = store();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc("createdAt"),
                Box::new(move |docs| {
                    let _ = tx.send(docs);
                }),
            )
            .await
            .unwrap();

        let initial = rx.recv().await.unwrap();
        assert!(initial.is_empty());

        let id = store
            .create(Collection::Bookings, json!({"createdAt": 1}))
            .await
            .unwrap();

        let snapshot = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ids(&snapshot), vec![id]);

        sub.unsubscribe().await;
    }

    #[tokio::test]
    async fn test_subscribe_ignores_other_collections() {
        let store = store();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc("createdAt"),
                Box::new(move |docs| {
                    let _ = tx.send(docs);
                }),
            )
            .await
            .unwrap();
        rx.recv().await.unwrap();

        store.create(Collection::Jobs, json!({"postedAt": 1})).await.unwrap();

        let next = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(next.is_err(), "no snapshot expected for unrelated collection");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let store = store();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc("createdAt"),
                Box::new(move |docs| {
                    let _ = tx.send(docs);
                }),
            )
            .await
            .unwrap();
        rx.recv().await.unwrap();

        sub.unsubscribe().await;
        store
            .create(Collection::Bookings, json!({"createdAt": 1}))
            .await
            .unwrap();

        // Callback (and its sender) is gone once the task is torn down
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber_catches_up() {
        let store = store();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let _sub = store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc("createdAt"),
                Box::new(move |docs| {
                    let _ = tx.send(docs);
                }),
            )
            .await
            .unwrap();
        rx.recv().await.unwrap();

        // More announcements than the channel holds, before the task gets to run
        for n in 0..200 {
            store
                .create(Collection::Bookings, json!({"createdAt": n}))
                .await
                .unwrap();
        }

        let mut last: Vec<Document> = vec![];
        while let Ok(Some(snapshot)) =
            tokio::time::timeout(Duration::from_millis(500), rx.recv()).await
        {
            last = snapshot;
        }
        assert_eq!(last.len(), 200);
    }

    #[tokio::test]
    async fn test_read_failure_ends_delivery() {
        let store = store();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sub = store
            .subscribe(
                Collection::Bookings,
                OrderBy::desc("createdAt"),
                Box::new(move |docs| {
                    let _ = tx.send(docs);
                }),
            )
            .await
            .unwrap();
        rx.recv().await.unwrap();

        lock(&store.conn)
            .unwrap()
            .execute("ALTER TABLE documents RENAME TO documents_gone", [])
            .unwrap();
        store.announce(Collection::Bookings);

        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert!(next.is_none(), "no snapshot after a failed read");

        tokio::time::timeout(Duration::from_secs(2), async {
            while sub.is_active() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
