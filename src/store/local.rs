//! Best-effort key/value persistence, one JSON file per data directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub const RESOURCES_KEY: &str = "resources_response";
pub const STORAGE_FILE: &str = "local_storage.json";

pub fn time_warp_key(user_id: &str) -> String {
    format!("time-warp-{user_id}")
}

#[derive(Debug, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Storage that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens `dir/local_storage.json`, creating `dir` if needed. A missing or
    /// corrupt file starts empty.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(STORAGE_FILE);
        let entries = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "discarding unreadable local storage");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        Ok(Self {
            path: Some(path),
            entries,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "ignoring malformed stored value");
                None
            }
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.flush();
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw),
            Err(err) => warn!(key, %err, "value not persisted"),
        }
    }

    fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_vec_pretty(&self.entries)
            .map_err(anyhow::Error::from)
            .and_then(|raw| fs::write(path, raw).map_err(anyhow::Error::from));
        if let Err(err) = result {
            warn!(path = %path.display(), %err, "local storage write failed");
        }
    }
}
