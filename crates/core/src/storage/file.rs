use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

use super::traits::StorageBackend;

/// Plain-text backend: the whole key space is one pretty-printed JSON object
/// on disk, rewritten on every change. Native only.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStorage {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    CoreError::InvalidFileFormat(format!(
                        "{} is not a JSON key-value file: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), CoreError> {
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize storage file: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl StorageBackend for JsonFileStorage {
    fn name(&self) -> &str {
        "json-file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), CoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), CoreError> {
        if let Some(old) = self.entries.remove(key) {
            if let Err(e) = self.flush() {
                self.entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
