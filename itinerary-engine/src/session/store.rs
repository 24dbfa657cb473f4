//! Disk persistence for the session token.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Persisted token with metadata.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    /// Unix timestamp when the token was saved.
    saved_at_secs: u64,
    token: String,
}

/// Configuration for the token store.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    /// Path to the token file.
    pub path: PathBuf,
}

impl TokenStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        // Default to a token file in the current directory
        Self::new("itinerary_token.json")
    }
}

/// Token file on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    config: TokenStoreConfig,
}

impl TokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self { config }
    }

    /// Load the saved token.
    ///
    /// Returns `None` if the file doesn't exist or is invalid.
    pub fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let stored: StoredToken = serde_json::from_str(&contents).ok()?;
        Some(stored.token).filter(|t| !t.is_empty())
    }

    /// Save a token, replacing any previous one.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| SessionError::Store {
                message: "system time before unix epoch".to_string(),
            })?
            .as_secs();

        let stored = StoredToken {
            saved_at_secs: now,
            token: token.to_string(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::Store {
                message: format!("failed to create token directory: {e}"),
            })?;
        }

        let json = serde_json::to_string_pretty(&stored).map_err(|e| SessionError::Store {
            message: format!("failed to serialize token: {e}"),
        })?;

        std::fs::write(&self.config.path, json).map_err(|e| SessionError::Store {
            message: format!("failed to write token file: {e}"),
        })
    }

    /// Delete the saved token. A missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.config.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Store {
                message: format!("failed to remove token file: {e}"),
            }),
        }
    }

    /// Get the token file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }
}
