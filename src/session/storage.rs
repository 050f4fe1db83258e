//! Durable backing for the session.
//!
//! The store hands storage an already-serialized JSON string; storage only
//! moves bytes. `FileStorage` writes through an owner-only temp file and
//! rename so a crash mid-write never leaves a half-written session behind.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application-defined key the session is persisted under.
pub const SESSION_STORAGE_KEY: &str = "bookstore_session";

/// Persistent key/value slot holding the serialized session.
pub trait SessionStorage: Send + Sync {
    /// Read the persisted value. `Ok(None)` when nothing was ever saved.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the persisted value.
    fn save(&self, value: &str) -> Result<()>;

    /// Remove the persisted value. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<()>;
}

// ── File storage ────────────────────────────────────────────────

/// One JSON file per key inside the data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            path: data_dir.join(format!("{key}.json")),
        }
    }

    /// Storage under the default session key.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir, SESSION_STORAGE_KEY)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read {}", self.path.display()))
            }
        }
    }

    fn save(&self, value: &str) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;

        // Created owner-only (0600 on unix) and unlinked on drop, so a failed
        // write or rename never leaves the token in a stray file.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // Older builds staged writes at a fixed `.json.tmp` sibling.
        remove_if_present(&self.path.with_extension("json.tmp"))?;
        remove_if_present(&self.path)
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

// ── Memory storage ──────────────────────────────────────────────

/// In-process slot. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded slot, as if a previous run had saved `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(value.into()))),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, value: &str) -> Result<()> {
        *self.slot.lock() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
