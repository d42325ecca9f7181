//! Key-value storage port and implementations.
//!
//! Every durable read/write in the system goes through [`StoragePort`],
//! injected into its consumers at construction time. Reads of missing keys
//! are not errors; write failures are surfaced as errors that callers are
//! expected to log and tolerate.

pub mod sqlite;

use std::collections::HashMap;

pub use sqlite::SqliteStorage;

/// Error raised by a storage backend
#[derive(Debug)]
pub struct StorageError(pub String);

impl std::fmt::Display for StorageError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "storage error: {}", self.0)
  }
}

impl std::error::Error for StorageError {}

/// Durable key-value storage contract.
///
/// `get` of an absent key returns `Ok(None)`. A failing `set` leaves the
/// caller's in-memory state authoritative until the next successful write.
pub trait StoragePort: Send {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
  fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
  /// Log the error at warn level and return the default
  fn log_warn_default(self, context: &str) -> T
  where
    T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }

  fn log_warn_default(self, context: &str) -> T
  where
    T: Default,
  {
    match self {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        T::default()
      }
    }
  }
}

/// In-memory storage for tests and degraded (persistence-less) operation
#[derive(Debug, Default)]
pub struct MemoryStorage {
  map: HashMap<String, String>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl StoragePort for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.map.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
    self.map.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_storage_roundtrip() {
    let mut storage = MemoryStorage::new();
    storage.set("ledger", "{}").unwrap();
    assert_eq!(storage.get("ledger").unwrap(), Some("{}".to_string()));
  }

  #[test]
  fn test_memory_storage_missing_key_is_none() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("absent").unwrap(), None);
  }

  #[test]
  fn test_memory_storage_overwrites() {
    let mut storage = MemoryStorage::new();
    storage.set("k", "a").unwrap();
    storage.set("k", "b").unwrap();
    assert_eq!(storage.get("k").unwrap(), Some("b".to_string()));
  }

  #[test]
  fn test_log_warn_default_returns_default_on_error() {
    let result: Result<Vec<i32>, StorageError> = Err(StorageError("boom".into()));
    let v = result.log_warn_default("test context");
    assert!(v.is_empty());
  }

  #[test]
  fn test_log_warn_passes_through_ok() {
    let result: Result<i32, StorageError> = Ok(7);
    assert_eq!(result.log_warn("test context"), Some(7));
  }
}
