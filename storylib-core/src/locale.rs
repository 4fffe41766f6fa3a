//! Localized directory segment names.

use crate::CoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

pub const TWINE: &str = "Twine";
pub const STORIES: &str = "Stories";
pub const BACKUPS: &str = "Backups";

/// Translates a fixed key into the segment name for the active locale.
pub trait Localizer: Send + Sync {
    fn say(&self, key: &str) -> String;
}

/// Returns every key as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLocale;

impl Localizer for DefaultLocale {
    fn say(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Lookup table that falls back to the key itself when a translation is missing.
/// The table may be swapped while the process runs; paths pick up the change on
/// their next computation.
#[derive(Debug, Default)]
pub struct TableLocale {
    table: RwLock<HashMap<String, String>>,
}

impl TableLocale {
    pub fn new(table: HashMap<String, String>) -> Self {
        Self { table: RwLock::new(table) }
    }

    /// Reads a JSON object of `{"key": "translation"}` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let data = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let table: HashMap<String, String> = serde_json::from_str(&data).map_err(|e| CoreError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        Ok(Self::new(table))
    }

    pub fn set(&self, key: &str, value: &str) {
        self.table.write().insert(key.to_string(), value.to_string());
    }

    pub fn replace(&self, table: HashMap<String, String>) {
        *self.table.write() = table;
    }
}

impl Localizer for TableLocale {
    fn say(&self, key: &str) -> String {
        self.table
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
