//! Persisted sign-in session.
//!
//! The session file is a small JSON key/value document. The signed-in user
//! record lives under [`SESSION_KEY`]; other keys are preserved on write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::constants::SESSION_KEY;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode session: {0}")]
    Json(#[from] serde_json::Error),
}

/// The signed-in user record returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Remaining fields of the user record (`username`, `email`, `_id`, ...).
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            profile: Map::new(),
        }
    }

    /// Display name from the user record, if the server sent one.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.profile.get("username").and_then(Value::as_str)
    }
}

/// Where the current session is kept.
///
/// `load` never fails: a missing or unreadable record means "not signed in".
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Option<Session>;
    async fn save(&self, session: &Session) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Session store backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the whole key/value document, treating a missing or corrupt file as empty.
    async fn read_entries(&self) -> Map<String, Value> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read session file: {e}");
                return Map::new();
            }
        };

        match serde_json::from_slice::<Map<String, Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "Session file is not a JSON object: {e}");
                Map::new()
            }
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let body = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Option<Session> {
        let mut entries = self.read_entries().await;
        let record = entries.remove(SESSION_KEY)?;

        match serde_json::from_value::<Session>(record) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => {
                debug!("Stored session has an empty token");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Stored session is malformed: {e}");
                None
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await;
        entries.insert(SESSION_KEY.to_string(), serde_json::to_value(session)?);
        self.write_entries(&entries).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut entries = self.read_entries().await;
        if entries.remove(SESSION_KEY).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Option<Session> {
        self.session
            .read()
            .await
            .clone()
            .filter(|s| !s.token.is_empty())
    }

    async fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.session.write().await = None;
        Ok(())
    }
}
