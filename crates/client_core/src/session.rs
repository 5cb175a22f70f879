//! Authenticated session state and its persistence boundary.
//!
//! A [`Session`] is either empty or holds both a bearer token and the display
//! name of the user it was issued for. Stores persist it as the two entries the
//! web storefront kept in local storage: `userToken` and `username`.

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Opaque bearer credential returned by login. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub token: AuthToken,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    credentials: Option<SessionCredentials>,
}

impl Session {
    pub fn authenticated(token: AuthToken, display_name: impl Into<String>) -> Self {
        Self {
            credentials: Some(SessionCredentials {
                token,
                display_name: display_name.into(),
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.credentials.as_ref().map(|c| &c.token)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.display_name.as_str())
    }
}

/// Wire form of a persisted session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(rename = "userToken", default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            user_token: session.token().map(|t| t.as_str().to_string()),
            username: session.display_name().map(str::to_string),
        }
    }
}

impl From<PersistedSession> for Session {
    fn from(persisted: PersistedSession) -> Self {
        // Both entries or nothing: a half-written record is a logged-out session.
        match (
            persisted.user_token.and_then(AuthToken::new),
            persisted.username.filter(|name| !name.is_empty()),
        ) {
            (Some(token), Some(display_name)) => Session::authenticated(token, display_name),
            _ => Session::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("failed to read session file '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write session file '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove session file '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("malformed session file '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Load-at-startup / save-on-change boundary for the session.
pub trait SessionStore: Send {
    fn load(&self) -> Result<Session, SessionStoreError>;
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn with_entries(entries: PersistedSession) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn entries(&self) -> PersistedSession {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Session, SessionStoreError> {
        Ok(self.entries().into())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = session.into();
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = PersistedSession::default();
        Ok(())
    }
}

/// JSON file holding the `userToken`/`username` entries. A missing file is an
/// empty session; clearing removes the file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Session, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(source) => {
                return Err(SessionStoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let persisted: PersistedSession =
            serde_json::from_str(&raw).map_err(|source| SessionStoreError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(persisted.into())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if !session.is_authenticated() {
            return self.clear();
        }

        let serialized = serde_json::to_string_pretty(&PersistedSession::from(session))?;
        let write_err = |source: io::Error| SessionStoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        write_owner_only(&self.path, serialized.as_bytes()).map_err(write_err)?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Writes a sibling `.tmp` file that is owner-only from creation, then
/// renames it over `path`.
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(&tmp)?;
    // A leftover tmp file keeps its old mode; `mode` only applies on create.
    restrict_permissions(&file)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(&tmp, path)
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}
