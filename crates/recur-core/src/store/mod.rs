//! Key-value persistence for detected patterns
//!
//! The pattern store keeps a single JSON document under a fixed key. Backends
//! only need get/set semantics:
//! - `MemoryStore` keeps documents in process (tests)
//! - `FileStore` keeps one JSON file per key in a directory
//!
//! Backends report failures as errors; the lifecycle manager decides how to
//! degrade.

use serde_json::Value;

use crate::error::Result;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the pattern list is stored
pub const PATTERNS_KEY: &str = "recurring_patterns";

/// Trait for key-value persistence backends
pub trait KeyValueStore: Send + Sync {
    /// Human-readable name for this backend
    fn name(&self) -> &str;

    /// Read the document stored under `key`, `None` if nothing is stored
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrite the document stored under `key`
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        (**self).set(key, value)
    }
}
