// SPDX-License-Identifier: MIT

//! Client-held credential store: the bearer token plus the cached identity.
//!
//! Writes are all-or-nothing: token and identity live in one struct, so no
//! reader can ever observe one without the other. Only the auth service
//! writes here; every other component just reads the token to attach it to
//! outgoing requests.
//!
//! The store is persisted as a single JSON file so a restarted process can
//! re-verify its previous token. An explicit logout removes the file.

use crate::error::{AppError, Result};
use crate::models::UserIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Token and identity, always stored together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredCredentials {
    /// Bearer token issued by the auth backend
    pub token: String,
    /// Identity cached from the auth response
    pub identity: UserIdentity,
}

/// Process-wide credential holder.
#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    current: Arc<RwLock<Option<StoredCredentials>>>,
}

impl CredentialStore {
    /// Create an empty store persisting to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a store and restore any previously persisted credentials.
    ///
    /// A missing or unreadable file just yields an empty store; a stale
    /// token is an expected steady-state condition, not an anomaly.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let store = Self::new(path);
        if let Some(creds) = read_file(&store.path) {
            *store.write_guard() = Some(creds);
        }
        store
    }

    /// Store token and identity atomically, persisting to disk.
    pub fn store(&self, creds: StoredCredentials) -> Result<()> {
        let json = serde_json::to_string_pretty(&creds)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize credentials: {}", e)))?;
        std::fs::write(&self.path, json)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("persist credentials: {}", e)))?;
        *self.write_guard() = Some(creds);
        Ok(())
    }

    /// Remove token and identity together. Always succeeds.
    pub fn clear(&self) {
        *self.write_guard() = None;
        // Best effort; a leftover file only means one extra failed verify
        // on the next startup.
        let _ = std::fs::remove_file(&self.path);
    }

    /// Current bearer token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.read_guard().as_ref().map(|c| c.token.clone())
    }

    /// Current cached identity, if authenticated.
    pub fn identity(&self) -> Option<UserIdentity> {
        self.read_guard().as_ref().map(|c| c.identity.clone())
    }

    /// Whether a token is currently held (says nothing about validity).
    pub fn has_token(&self) -> bool {
        self.read_guard().is_some()
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Option<StoredCredentials>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Option<StoredCredentials>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn read_file(path: &Path) -> Option<StoredCredentials> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(creds) => Some(creds),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Ignoring corrupt credential file");
            None
        }
    }
}
