//! Durable storage for the contact collection.
//!
//! The whole collection lives under a single key as JSON text. The
//! [`Storage`] trait only moves that text in and out; decoding and the
//! per-record tolerance rules live in [`decode_collection`], so every
//! backend gets the same load semantics.
//!
//! | Backend | Key |
//! |---------|-----|
//! | [`JsonFileStorage`] | a JSON file on disk |
//! | [`MemoryStorage`] | an in-process string (tests, `--ephemeral`) |

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::models::Contact;

/// A single-key text store holding the serialized collection.
pub trait Storage: Send + Sync {
    /// Read the stored text. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored text wholesale.
    fn save(&self, text: &str) -> Result<()>;
}

/// Stores the collection as a JSON file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read contacts file: {}", self.path.display())),
        }
    }

    fn save(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }

        // Write-then-rename so a crash never leaves a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory storage key.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(text.into())),
        }
    }

    /// Current stored text, for assertions.
    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.clone())
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, text: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

/// Decode stored text into contacts.
///
/// The text must be a JSON array. Elements that do not decode as a
/// [`Contact`] are logged and dropped; the rest are kept in order.
pub fn decode_collection(text: &str) -> Result<Vec<Contact>> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(text).context("stored contacts are not a JSON array")?;

    let mut contacts = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Contact>(item) {
            Ok(contact) => contacts.push(contact),
            Err(e) => tracing::warn!(index, error = %e, "discarding unreadable stored contact"),
        }
    }
    Ok(contacts)
}

pub fn encode_collection(contacts: &[Contact]) -> Result<String> {
    Ok(serde_json::to_string(contacts)?)
}
