//! # Persisted State
//!
//! Durable string key-value storage, the `localStorage` of this layer.
//! Two keys are used: the presentation theme and the preferred code tab
//! language. `FileStorage` keeps them in `~/.guidenav/state.json`.
//!
//! All writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::core::error::UiError;

pub const THEME_KEY: &str = "theme";
pub const CODE_TAB_KEY: &str = "code-tab-lang";

pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-object file storage. The whole map is rewritten on every `set`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Returns `~/.guidenav/state.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".guidenav").join("state.json"))
    }

    /// Opens storage at `path`. A missing or unreadable file yields empty
    /// storage; the file is only created on the first write.
    pub fn open(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read state file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("Loaded {} persisted values from {}", values.len(), path.display());
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), UiError> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write_json(&self.path, &self.values)?;
        Ok(())
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json(path: &Path, data: &BTreeMap<String, String>) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
