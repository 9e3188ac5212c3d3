// SPDX-License-Identifier: MIT

//! Paceline client SDK.
//!
//! Client side of the Paceline running-coaching backend: a typed API
//! client with a single-slot profile cache, persisted session state, the
//! entitlement resolver, the purchase flow, and the onboarding wizard.
//! The presentation layer sits on top and observes [`SessionStore`] to
//! pick a screen.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::Config;
use error::{ApiError, Result};
use services::{entitlement, ApiClient, EntitlementState, SessionStatus, SessionStore};

/// Composition root: one per process.
///
/// Owns the API client (and with it the profile cache) and the session
/// store, restoring any persisted session at construction.
pub struct App {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
}

impl App {
    /// Build the app from configuration, restoring a persisted session.
    pub fn new(config: Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        let session = Arc::new(SessionStore::open(config.session_file.clone()));
        Ok(Self {
            config,
            api,
            session,
        })
    }

    /// Validate a restored session by exchanging the persisted token for a
    /// fresh one. A refresh failure means the credentials are no longer
    /// usable, so the session is cleared.
    pub async fn restore_session(&self) -> Result<SessionStatus> {
        let Some(token) = self.session.token() else {
            return Ok(SessionStatus::LoggedOut);
        };

        match self.api.refresh_token(&token).await {
            Ok(new_token) => {
                self.session.update_token(new_token);
                self.session.set_status(SessionStatus::LoggedIn);
                Ok(SessionStatus::LoggedIn)
            }
            Err(e @ (ApiError::TokenRefresh(_) | ApiError::Http { .. })) => {
                tracing::warn!(error = %e, "Token refresh rejected, signing out");
                self.sign_out().await;
                Ok(SessionStatus::LoggedOut)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve the current entitlement for the signed-in user.
    pub async fn resolve_entitlement(&self) -> Result<EntitlementState> {
        let token = self.session.token().ok_or(ApiError::MissingToken)?;
        entitlement::resolve(&self.api, &token).await
    }

    /// Sign out: clear session state, delete persisted credentials, and
    /// drop the cached profile so the next account never sees it.
    pub async fn sign_out(&self) {
        self.session.sign_out();
        self.api.clear_profile_cache().await;
    }
}
