//! Persistent credential slot.
//!
//! # File layout
//!
//! ```text
//! ~/.config/paydesk/credentials.json
//!   {"token": "...", "role": "MERCHANT", "userId": "42"}
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PaydeskError, PaydeskResult};

/// Contents of the credential slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A single credential slot. Each `save` or `clear` is one write.
pub trait CredentialStore {
    fn load(&self) -> PaydeskResult<Option<StoredCredential>>;

    fn save(&mut self, credential: &StoredCredential) -> PaydeskResult<()>;

    fn clear(&mut self) -> PaydeskResult<()>;
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<StoredCredential>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            slot: Some(credential),
            writes: 0,
        }
    }

    /// Number of `save`/`clear` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> PaydeskResult<Option<StoredCredential>> {
        Ok(self.slot.clone())
    }

    fn save(&mut self, credential: &StoredCredential) -> PaydeskResult<()> {
        self.slot = Some(credential.clone());
        self.writes += 1;
        Ok(())
    }

    fn clear(&mut self) -> PaydeskResult<()> {
        self.slot = None;
        self.writes += 1;
        Ok(())
    }
}

/// JSON file store, private to the current user on unix.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/paydesk/credentials.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("paydesk").join("credentials.json"))
    }

    pub fn at_default_location() -> PaydeskResult<Self> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| PaydeskError::Config {
                message: "no configuration directory for the current user".into(),
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_err(&self, action: &str, e: impl std::fmt::Display) -> PaydeskError {
        PaydeskError::Store {
            message: format!("failed to {} {}: {}", action, self.path.display(), e),
        }
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> PaydeskResult<Option<StoredCredential>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.store_err("read", e)),
        };

        let credential = serde_json::from_str(&text).map_err(|e| self.store_err("parse", e))?;
        Ok(Some(credential))
    }

    fn save(&mut self, credential: &StoredCredential) -> PaydeskResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.store_err("create directory for", e))?;
        }

        let json = serde_json::to_string_pretty(credential)
            .map_err(|e| self.store_err("serialize", e))?;

        // Slot is replaced atomically via rename.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.store_err("write", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.store_err("set permissions on", e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| self.store_err("replace", e))?;
        debug!(path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn clear(&mut self) -> PaydeskResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed credential");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.store_err("remove", e)),
        }
    }
}
