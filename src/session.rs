//! Session / bearer-credential layer.
//!
//! Every remote call authenticates with a bearer token obtained from an
//! injected [`CredentialStore`] — no ambient global. A 401/403 from any
//! call funnels into [`Session::auth_failed`], which clears credentials
//! and redirects to sign-in exactly once, no matter how many concurrent
//! calls observe the stale session at the same time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config;
use crate::error::CoreError;
use crate::nav::{Destination, Navigator};
use crate::util::atomic_write_str;

/// Persisted session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    #[serde(alias = "accessToken")]
    pub token: String,
    /// Signed-in account email, when the sign-in flow reported one.
    #[serde(default)]
    pub account: Option<String>,
}

/// Where the bearer credential lives. File-backed in the app, in-memory
/// for tests and shell-managed sessions.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, CoreError>;
    fn save(&self, token: &SessionToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// `~/.rankscope/session.json`, mode 0600 on unix.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location under the config dir.
    pub fn default_location() -> Result<Self, CoreError> {
        Ok(Self::new(config::config_dir()?.join("session.json")))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<SessionToken>, CoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let token: SessionToken = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    fn save(&self, token: &SessionToken) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(token)?;
        atomic_write_str(&self.path, &content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and embedding shells that own the credential.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<SessionToken>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(SessionToken {
                token: token.to_string(),
                account: None,
            })),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SessionToken>, CoreError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &SessionToken) -> Result<(), CoreError> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.token.lock() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    SignedIn,
    SignedOut,
}

/// Credential provider injected into the request layer.
pub struct Session {
    store: Box<dyn CredentialStore>,
    nav: Arc<dyn Navigator>,
    /// One-shot guard: the first 401 wins, the rest are no-ops until the
    /// next successful sign-in.
    invalidated: AtomicBool,
    phase_tx: watch::Sender<SessionPhase>,
}

impl Session {
    pub fn new(store: Box<dyn CredentialStore>, nav: Arc<dyn Navigator>) -> Self {
        let phase = match store.load() {
            Ok(Some(_)) => SessionPhase::SignedIn,
            Ok(None) => SessionPhase::SignedOut,
            Err(e) => {
                log::warn!("session: credential store unreadable: {}", e);
                SessionPhase::SignedOut
            }
        };
        // Updates go through send_replace so the phase is stored even
        // while nothing subscribes.
        let (phase_tx, _) = watch::channel(phase);
        Session {
            store,
            nav,
            invalidated: AtomicBool::new(false),
            phase_tx,
        }
    }

    /// The bearer token for the next request, or `Auth` when signed out.
    /// Does not trigger the sign-out policy: with no credential there is
    /// nothing to clear, and the shell is already on the sign-in screen.
    pub fn bearer(&self) -> Result<String, CoreError> {
        match self.store.load()? {
            Some(t) => Ok(t.token),
            None => Err(CoreError::Auth),
        }
    }

    /// Signed-in account email for the shell's header, when known.
    pub fn peek_account(&self) -> Option<String> {
        self.store
            .load()
            .ok()
            .flatten()
            .and_then(|t| t.account)
            .filter(|a| !a.trim().is_empty())
    }

    pub fn sign_in(&self, token: SessionToken) -> Result<(), CoreError> {
        self.store.save(&token)?;
        self.invalidated.store(false, Ordering::SeqCst);
        self.phase_tx.send_replace(SessionPhase::SignedIn);
        log::info!("session: signed in{}", match &token.account {
            Some(a) => format!(" as {}", a),
            None => String::new(),
        });
        Ok(())
    }

    /// Explicit user sign-out. Clears the credential without redirecting;
    /// the shell initiated this and handles its own navigation.
    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.store.clear()?;
        self.phase_tx.send_replace(SessionPhase::SignedOut);
        Ok(())
    }

    /// Cross-cutting 401/403 policy: clear local credentials and redirect
    /// to sign-in. Safe to call from every failing request concurrently —
    /// only the first call acts.
    pub fn auth_failed(&self) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        log::warn!("session: remote rejected credentials, signing out");
        if let Err(e) = self.store.clear() {
            log::warn!("session: failed to clear credentials: {}", e);
        }
        self.phase_tx.send_replace(SessionPhase::SignedOut);
        self.nav.go(Destination::SignIn);
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase_tx.borrow()
    }

    /// Watch the session phase; the shell flips views on change.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }
}
