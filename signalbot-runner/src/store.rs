//! File-backed signal store.
//!
//! All signals live in one JSON document. Every save rewrites the whole
//! document to a `.tmp` sibling and renames it over the original, so a crash
//! mid-write leaves the previous version intact.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use signalbot_core::domain::{Signal, SignalId};
use signalbot_core::store::{SignalStore, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    signals: Vec<Signal>,
}

#[derive(Debug)]
pub struct JsonSignalStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonSignalStore {
    /// A store at `path`. A missing file reads as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One past the highest id in the store.
    pub fn next_id(&self) -> Result<SignalId, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let file = self.read()?;
        Ok(next_id_after(&file.signals))
    }

    fn read(&self) -> Result<StoreFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(StoreFile::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(file)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io(e)
        })?;
        debug!(path = %self.path.display(), signals = file.signals.len(), "store written");
        Ok(())
    }
}

/// Smallest id greater than every id in `signals`, starting at 1.
pub fn next_id_after(signals: &[Signal]) -> SignalId {
    SignalId(signals.iter().map(|s| s.id.0).max().map_or(1, |max| max + 1))
}

impl SignalStore for JsonSignalStore {
    fn save(&self, signal: &Signal) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut file = self.read()?;
        match file.signals.iter_mut().find(|s| s.id == signal.id) {
            Some(existing) => *existing = signal.clone(),
            None => {
                file.signals.push(signal.clone());
                file.signals.sort_by_key(|s| s.id);
            }
        }
        self.write(&file)
    }

    fn load(&self, id: SignalId) -> Result<Signal, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.read()?
            .signals
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn all(&self) -> Result<Vec<Signal>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut signals = self.read()?.signals;
        signals.sort_by_key(|s| s.id);
        Ok(signals)
    }
}
