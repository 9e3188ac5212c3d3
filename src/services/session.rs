// SPDX-License-Identifier: MIT

//! Process-wide session state: auth status, bearer token, user id, auth
//! method, with file-backed persistence of the credentials.
//!
//! Invariant: a present token implies the status is not `LoggedOut`.
//! All mutation goes through [`SessionStore`]; readers get value
//! snapshots, never references into the shared state.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Which screen-level state the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    LoggedOut,
    Loading,
    NewUser,
    GeneratingPlan,
    LoggedIn,
}

/// How the user authenticated. Persists across process restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// External identity provider (e.g. platform sign-in)
    ExternalIdentity,
    /// OAuth against the fitness platform the plan data comes from
    #[default]
    FitnessPlatform,
}

/// Current user's auth context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub status: SessionStatus,
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub auth_method: AuthMethod,
}

impl Session {
    /// Fresh signed-out session.
    pub fn signed_out() -> Self {
        Self {
            status: SessionStatus::LoggedOut,
            token: None,
            user_id: None,
            auth_method: AuthMethod::default(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.status == SessionStatus::LoggedIn
    }
}

/// The credentials slice of the session that survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: Option<String>,
    user_id: Option<String>,
    auth_method: AuthMethod,
}

/// Owner of the session state. Mutations persist the credential slice to a
/// JSON file so the session can be restored at next process start.
pub struct SessionStore {
    path: PathBuf,
    session: RwLock<Session>,
}

impl SessionStore {
    /// Open the store, restoring a persisted session if one exists.
    ///
    /// A restored session starts in `Loading`: the token is present but
    /// not yet validated against the backend.
    pub fn open(path: PathBuf) -> Self {
        let session = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) if persisted.token.is_some() => {
                    tracing::info!("Restored persisted session");
                    Session {
                        status: SessionStatus::Loading,
                        token: persisted.token,
                        user_id: persisted.user_id,
                        auth_method: persisted.auth_method,
                    }
                }
                Ok(persisted) => Session {
                    auth_method: persisted.auth_method,
                    ..Session::signed_out()
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Session file unreadable, starting signed out");
                    Session::signed_out()
                }
            },
            Err(_) => Session::signed_out(),
        };

        Self {
            path,
            session: RwLock::new(session),
        }
    }

    /// Value snapshot of the whole session.
    pub fn session(&self) -> Session {
        self.session.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.read().unwrap_or_else(std::sync::PoisonError::into_inner).status
    }

    /// Copy-on-read token snapshot.
    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .user_id
            .clone()
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.session
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .auth_method
    }

    /// Store credentials after authentication. Status moves to `Loading`
    /// until the caller resolves the next screen (new user vs. dashboard).
    pub fn sign_in(&self, token: String, user_id: Option<String>, auth_method: AuthMethod) {
        {
            let mut session = self.session.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            session.token = Some(token);
            session.user_id = user_id;
            session.auth_method = auth_method;
            session.status = SessionStatus::Loading;
        }
        self.persist();
        tracing::info!("Signed in");
    }

    /// Replace the bearer token (after a successful refresh).
    pub fn update_token(&self, token: String) {
        {
            let mut session = self.session.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            session.token = Some(token);
            if session.status == SessionStatus::LoggedOut {
                session.status = SessionStatus::Loading;
            }
        }
        self.persist();
    }

    /// Move the session to a new status.
    ///
    /// `LoggedOut` is not reachable this way; use [`SessionStore::sign_out`]
    /// so the token is cleared with it.
    pub fn set_status(&self, status: SessionStatus) {
        if status == SessionStatus::LoggedOut {
            self.sign_out();
            return;
        }
        let mut session = self.session.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        session.status = status;
    }

    /// Clear all auth state and delete the persisted file.
    pub fn sign_out(&self) {
        {
            let mut session = self.session.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            *session = Session::signed_out();
        }
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(error = %e, "Failed to delete session file");
            }
        }
        tracing::info!("Signed out");
    }

    /// Write the credential slice to disk. Failures are logged, not fatal:
    /// the in-memory session stays authoritative for this process.
    fn persist(&self) {
        let persisted = {
            let session = self.session.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            PersistedSession {
                token: session.token.clone(),
                user_id: session.user_id.clone(),
                auth_method: session.auth_method,
            }
        };

        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let raw = serde_json::to_string_pretty(&persisted)?;
            fs::write(&self.path, raw)
        };

        if let Err(e) = write() {
            tracing::warn!(error = %e, "Failed to persist session, continuing anyway");
        }
    }
}
