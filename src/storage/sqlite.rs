//! SQLite-backed key-value storage.

use rusqlite::{params, Connection};
use std::path::Path;

use super::{StorageError, StoragePort};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the storage database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path).map_err(|e| StorageError(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database, used by tests that want the real SQL path
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError(e.to_string()))?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(|e| StorageError(e.to_string()))
}

impl StoragePort for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let result = self.conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
                params![key, value, now],
            )
            .map_err(|e| StorageError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/store.db");
        let storage = SqliteStorage::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("ledger", r#"{"attempt_history":[]}"#).unwrap();
        assert_eq!(
            storage.get("ledger").unwrap(),
            Some(r#"{"attempt_history":[]}"#.to_string())
        );
    }

    #[test]
    fn test_replace_keeps_single_row() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("second".to_string()));
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.db");
        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage.set("exposure::Physics::Electrostatics", "{}").unwrap();
        }
        let storage = SqliteStorage::open(&path).unwrap();
        assert_eq!(
            storage.get("exposure::Physics::Electrostatics").unwrap(),
            Some("{}".to_string())
        );
    }
}
