use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::core::utils::{write_atomic, PathResolver};
use crate::errors::{Result, SplitError};

use super::KeyValueStore;

type Entries = BTreeMap<String, String>;

/// Stores every key in a single JSON object file.
///
/// The file is re-read on each access so several handles on the same path
/// observe each other's writes. Every write replaces the file atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` inside the data directory (or `root` when given).
    pub fn in_data_dir(root: Option<PathBuf>) -> Self {
        let base = PathResolver::resolve_base(root);
        Self::new(PathResolver::session_file_in(&base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&data).map_err(|err| {
            SplitError::StorageError(format!(
                "`{}` is not a valid session file: {}",
                self.path.display(),
                err
            ))
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        write_atomic(&self.path, &json)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn set_many(&mut self, updates: &[(&str, String)]) -> Result<()> {
        let mut entries = self.read_entries()?;
        for (key, value) in updates {
            entries.insert((*key).to_string(), value.clone());
        }
        self.write_entries(&entries)
    }
}
