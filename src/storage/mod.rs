//! Key-value persistence for wizard sessions.
//!
//! The session is stored under four fixed keys (see [`session`]); each value
//! is a string, so any backend able to map keys to text can hold it.

pub mod json_backend;
pub mod memory;
pub mod session;

use crate::errors::Result;

/// Minimal string store the session is persisted through.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Writes several entries. Backends that can batch should override this.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;
pub use session::LoadReport;
