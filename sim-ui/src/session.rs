//! Session token persistence and the login lifecycle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sim_core::{Credentials, ServiceError, SessionToken, SimulatorService};
use tracing::{debug, info, warn};

use crate::lock;
use crate::messages::{INVALID_CREDENTIALS, LOGIN_TO_CONTINUE, MISSING_CREDENTIALS};
use crate::surface::Surface;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("cannot access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode session file: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Durable home of the session token, keyed `auth_token`.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<SessionToken>, TokenStoreError>;

    fn set(
        &self,
        token: &SessionToken,
    ) -> Result<(), TokenStoreError>;

    fn clear(&self) -> Result<(), TokenStoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<SessionToken>,
}

/// Token kept in a small TOML file that survives restarts.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(
        &self,
        source: std::io::Error,
    ) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let file: SessionFile = toml::from_str(&text).map_err(|source| TokenStoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(file.auth_token.filter(|token| !token.as_str().is_empty()))
    }

    fn set(
        &self,
        token: &SessionToken,
    ) -> Result<(), TokenStoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let text = toml::to_string(&SessionFile {
            auth_token: Some(token.clone()),
        })?;
        std::fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SessionToken::new(token))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        Ok(lock(&self.token).clone())
    }

    fn set(
        &self,
        token: &SessionToken,
    ) -> Result<(), TokenStoreError> {
        *lock(&self.token) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *lock(&self.token) = None;
        Ok(())
    }
}

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    /// Blank user or password; nothing was sent.
    MissingFields,
    Rejected,
}

/// Owns the current token and keeps the login overlay in sync with it.
///
/// The token is cached in memory and written through to the store; store
/// failures are logged and do not end the session.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    surface: Arc<dyn Surface>,
    token: Mutex<Option<SessionToken>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn TokenStore>,
        surface: Arc<dyn Surface>,
    ) -> Self {
        let token = store.get().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable session");
            None
        });
        Self {
            store,
            surface,
            token: Mutex::new(token),
        }
    }

    pub fn token(&self) -> Option<SessionToken> {
        lock(&self.token).clone()
    }

    pub fn is_logged_in(&self) -> bool {
        lock(&self.token).is_some()
    }

    /// Returns the token, or raises the login overlay with `message` in the
    /// error banner.
    pub fn guard(
        &self,
        message: Option<&str>,
    ) -> Option<SessionToken> {
        let token = self.token();
        if token.is_none() {
            self.surface.set_login_visible(true);
            if let Some(message) = message {
                self.surface.set_error(Some(message));
            }
        }
        token
    }

    /// Ends the session `rejected` belongs to. Returns `false`, leaving
    /// the session alone, when that token is no longer current: it was
    /// already expired by another caller or replaced by a new login.
    pub fn expire(
        &self,
        rejected: &SessionToken,
    ) -> bool {
        {
            let mut current = lock(&self.token);
            if current.as_ref() != Some(rejected) {
                debug!("401 for a session that is no longer current");
                return false;
            }
            current.take();
        }
        info!("session rejected by service, login required");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.surface.set_login_visible(true);
        true
    }

    /// Routes `error` through [`expire`](Self::expire) when it is a 401 to
    /// a request sent with `sent_with`.
    pub fn check(
        &self,
        error: &ServiceError,
        sent_with: &SessionToken,
    ) {
        if error.is_unauthorized() {
            self.expire(sent_with);
        }
    }

    pub async fn login(
        &self,
        service: &dyn SimulatorService,
        user: &str,
        password: &str,
    ) -> LoginOutcome {
        self.surface.set_login_error(None);

        let credentials = Credentials::new(user, password);
        if !credentials.is_complete() {
            self.surface.set_login_error(Some(MISSING_CREDENTIALS));
            return LoginOutcome::MissingFields;
        }

        match service.login(&credentials).await {
            Ok(token) => {
                if let Err(e) = self.store.set(&token) {
                    warn!(error = %e, "session will not survive restart");
                }
                *lock(&self.token) = Some(token);
                self.surface.set_login_visible(false);
                info!(user = %credentials.login, "logged in");
                LoginOutcome::LoggedIn
            }
            Err(e) => {
                debug!(error = %e, user = %credentials.login, "login failed");
                self.surface.set_login_error(Some(INVALID_CREDENTIALS));
                LoginOutcome::Rejected
            }
        }
    }

    /// Drops the token and shows the overlay. Input reset is the caller's
    /// job.
    pub fn logout(&self) {
        lock(&self.token).take();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.surface.set_login_visible(true);
        self.surface.set_status(LOGIN_TO_CONTINUE);
        self.surface.set_error(None);
    }
}
