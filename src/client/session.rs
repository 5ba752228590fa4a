//! Client-side credential lifecycle.
//!
//! The token and role live in an [`AuthContext`] that views receive
//! explicitly. It is loaded once at start-up, filled by `sign_in` after a
//! successful login, and emptied by `sign_out`. Persistence goes through a
//! [`CredentialStore`].

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::auth::{claims::Role, dto::LoginResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

impl From<LoginResponse> for Session {
    fn from(res: LoginResponse) -> Self {
        Self {
            token: res.token,
            username: res.user.username,
            role: res.user.role,
        }
    }
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Session>>;
    fn save(&self, session: &Session) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Keeps the session as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        let session = serde_json::from_str(&raw)
            .with_context(|| format!("parse session in {}", self.path.display()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw).with_context(|| format!("write {}", self.path.display()))
    }

    fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_context(|| format!("remove {}", self.path.display()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Session>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> anyhow::Result<Option<Session>> {
        Ok(self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))?
            .clone())
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        *self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("credential slot poisoned"))? = None;
        Ok(())
    }
}

pub struct AuthContext {
    store: Box<dyn CredentialStore>,
    session: Option<Session>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("username", &self.session.as_ref().map(|s| &s.username))
            .field("role", &self.role())
            .finish()
    }
}

impl AuthContext {
    pub fn new(store: impl CredentialStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            session: None,
        }
    }

    /// Context with nothing persisted between runs.
    pub fn in_memory() -> Self {
        Self::new(MemoryCredentialStore::default())
    }

    /// Restores a previously persisted session, if any.
    pub fn load(&mut self) -> anyhow::Result<()> {
        self.session = self.store.load()?;
        Ok(())
    }

    pub fn sign_in(&mut self, session: Session) -> anyhow::Result<()> {
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn sign_out(&mut self) -> anyhow::Result<()> {
        self.session = None;
        self.store.clear()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(|s| s.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
