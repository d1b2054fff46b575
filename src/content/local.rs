//! SQLite-backed local durable store for content records.
//!
//! This is the always-available half of the replication pair: every artifact
//! lands here first, inside a transaction, before any network mirror is
//! attempted. Failures here are the one fatal error class.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::content::record::ContentRecord;
use crate::error::CoreError;

/// Local key-value store of content records, keyed by artifact id.
pub struct LocalContentStore {
    conn: Mutex<Connection>,
}

impl LocalContentStore {
    /// Create or open the store at `~/.config/publishlab/content.db`.
    pub fn new() -> Result<Self, CoreError> {
        let db_path = Self::default_db_path()?;
        Self::open_at(db_path)
    }

    /// Create or open the store at an explicit path. Re-opening the same
    /// path sees all previously committed records.
    pub fn open_at(db_path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::LocalStore(format!("failed to create data dir: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| CoreError::LocalStore(format!("failed to open content db: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS content (
                id TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_content_created
                ON content(created_at DESC);
        "#,
        )
        .map_err(|e| CoreError::LocalStore(format!("failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn default_db_path() -> Result<PathBuf, CoreError> {
        dirs::config_dir()
            .map(|d| d.join("publishlab").join("content.db"))
            .ok_or_else(|| CoreError::LocalStore("could not determine config directory".into()))
    }

    /// Upsert a record by id inside a transaction. Commits or rolls back
    /// atomically; a second put with the same id replaces the first.
    pub fn put(&self, record: &ContentRecord) -> Result<(), CoreError> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn.lock().unwrap();

        let tx = conn
            .transaction()
            .map_err(|e| CoreError::LocalStore(format!("failed to begin transaction: {}", e)))?;
        tx.execute(
            r#"
            INSERT INTO content (id, record, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                record = excluded.record,
                created_at = excluded.created_at
            "#,
            params![record.id, json, record.created_at.timestamp_millis()],
        )
        .map_err(|e| CoreError::LocalStore(format!("failed to upsert record: {}", e)))?;
        tx.commit()
            .map_err(|e| CoreError::LocalStore(format!("failed to commit: {}", e)))?;

        debug!(id = %record.id, "Stored content record locally");
        Ok(())
    }

    /// Fetch one record by id.
    pub fn get(&self, id: &str) -> Result<Option<ContentRecord>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let result = conn.query_row(
            "SELECT record FROM content WHERE id = ?",
            params![id],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CoreError::LocalStore(format!("query failed: {}", e))),
        }
    }

    /// Fetch every record, newest first.
    pub fn get_all(&self) -> Result<Vec<ContentRecord>, CoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT record FROM content ORDER BY created_at DESC")
            .map_err(|e| CoreError::LocalStore(format!("query prepare failed: {}", e)))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::LocalStore(format!("query failed: {}", e)))?;

        let mut records = Vec::new();
        for json in rows {
            let json = json.map_err(|e| CoreError::LocalStore(format!("row read failed: {}", e)))?;
            records.push(serde_json::from_str(&json)?);
        }
        Ok(records)
    }

    /// Delete a record by id. Missing ids are fine.
    pub fn delete(&self, id: &str) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM content WHERE id = ?", params![id])
            .map_err(|e| CoreError::LocalStore(format!("failed to delete record: {}", e)))?;
        Ok(())
    }

    /// Remove every record.
    pub fn clear(&self) -> Result<(), CoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM content", [])
            .map_err(|e| CoreError::LocalStore(format!("failed to clear store: {}", e)))?;
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize, CoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM content", [], |row| row.get(0))
            .map_err(|e| CoreError::LocalStore(format!("count failed: {}", e)))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::record::ContentCategory;

    fn temp_store() -> (tempfile::TempDir, LocalContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::open_at(dir.path().join("content.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_put_then_get_all() {
        let (_dir, store) = temp_store();
        let record = ContentRecord::new(ContentCategory::TextToImage, "blob://a");

        store.put(&record).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all, vec![record]);
    }

    #[test]
    fn test_put_is_idempotent_upsert() {
        let (_dir, store) = temp_store();
        let mut record = ContentRecord::new(ContentCategory::TextToImage, "blob://a");

        store.put(&record).unwrap();
        record.payload_ref = "blob://b".into();
        store.put(&record).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get(&record.id).unwrap().unwrap().payload_ref, "blob://b");
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.db");
        let record = ContentRecord::new(ContentCategory::ManuscriptDoctor, "blob://m");

        {
            let store = LocalContentStore::open_at(&path).unwrap();
            store.put(&record).unwrap();
        }

        let store = LocalContentStore::open_at(&path).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, record.id);
    }

    #[test]
    fn test_get_all_is_newest_first() {
        let (_dir, store) = temp_store();
        let mut older = ContentRecord::new(ContentCategory::TextToImage, "blob://old");
        older.created_at = older.created_at - chrono::Duration::hours(1);
        let newer = ContentRecord::new(ContentCategory::TextToImage, "blob://new");

        store.put(&older).unwrap();
        store.put(&newer).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
    }

    #[test]
    fn test_delete_and_clear() {
        let (_dir, store) = temp_store();
        let a = ContentRecord::new(ContentCategory::TextToImage, "blob://a");
        let b = ContentRecord::new(ContentCategory::PodMerch, "blob://b");

        store.put(&a).unwrap();
        store.put(&b).unwrap();

        store.delete(&a.id).unwrap();
        assert!(store.get(&a.id).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);

        store.delete("missing").unwrap();

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }
}
