// SPDX-License-Identifier: MIT

//! Backend API client.
//!
//! One method per backend operation. Every call is a single attempt with a
//! bounded timeout; there are no automatic retries, and each call produces
//! exactly one terminal outcome (typed payload or [`ApiError`]).
//!
//! The client owns the single-slot profile cache: `fetch_profile` consults
//! it first, `save_preferences` patches it in place, and sign-out clears it
//! through [`ApiClient::clear_profile_cache`].

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::{RwLock, Semaphore};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{Preferences, ProfileRecord, TrainingPlan, TrainingWeek, WeekSummary};

/// Last-fetched profile with its fetch timestamp.
#[derive(Debug, Clone)]
struct CachedProfile {
    profile: ProfileRecord,
    fetched_at: Instant,
}

/// Backend API client with bearer-token auth.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    /// Caps concurrent requests to the backend host.
    limiter: Semaphore,
    /// Single-slot profile cache (one user session at a time).
    profile_cache: RwLock<Option<CachedProfile>>,
    cache_ttl: Duration,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            limiter: Semaphore::new(config.max_connections),
            profile_cache: RwLock::new(None),
            cache_ttl: config.profile_cache_ttl,
        })
    }

    // ─── Profile ─────────────────────────────────────────────────────────

    /// Get the user's profile, returning the cached copy when it is still
    /// fresh (no network call).
    pub async fn fetch_profile(&self, token: &str) -> Result<ProfileRecord> {
        self.fetch_profile_inner(token, false).await
    }

    /// Cache-bypassing profile fetch: always hits the network and updates
    /// the cache timestamp.
    pub async fn force_refresh_profile(&self, token: &str) -> Result<ProfileRecord> {
        self.fetch_profile_inner(token, true).await
    }

    async fn fetch_profile_inner(&self, token: &str, force: bool) -> Result<ProfileRecord> {
        if !force {
            let cache = self.profile_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() <= self.cache_ttl {
                    tracing::debug!("Profile cache hit");
                    return Ok(cached.profile.clone());
                }
            }
        }

        #[derive(Deserialize)]
        struct ProfileResponse {
            #[allow(dead_code)]
            success: bool,
            profile: ProfileRecord,
        }

        let response: ProfileResponse = self.get_json("profile", token, "Profile").await?;

        let mut cache = self.profile_cache.write().await;
        *cache = Some(CachedProfile {
            profile: response.profile.clone(),
            fetched_at: Instant::now(),
        });

        Ok(response.profile)
    }

    /// Drop the cached profile (e.g. on sign-out, so the next user on this
    /// device never sees a stale record).
    pub async fn clear_profile_cache(&self) {
        *self.profile_cache.write().await = None;
    }

    /// The cached profile, if any, regardless of age.
    pub async fn cached_profile(&self) -> Option<ProfileRecord> {
        self.profile_cache
            .read()
            .await
            .as_ref()
            .map(|c| c.profile.clone())
    }

    // ─── Training data ───────────────────────────────────────────────────

    /// Get the current training week (past activities + remaining sessions).
    pub async fn fetch_training_week(&self, token: &str) -> Result<TrainingWeek> {
        self.get_json("training-week", token, "Training week").await
    }

    /// Get the full multi-week training plan.
    pub async fn fetch_training_plan(&self, token: &str) -> Result<TrainingPlan> {
        self.get_json("training-plan", token, "Training plan").await
    }

    /// Get aggregated historical weeks, newest first.
    ///
    /// The response is double-encoded: a list of JSON strings, each
    /// independently parsed into a [`WeekSummary`]. A single malformed
    /// element fails the whole call; list order is preserved.
    pub async fn fetch_weekly_summaries(&self, token: &str) -> Result<Vec<WeekSummary>> {
        #[derive(Deserialize)]
        struct SummariesResponse {
            #[allow(dead_code)]
            success: bool,
            weekly_summaries: Vec<String>,
        }

        let response: SummariesResponse = self
            .get_json("weekly-summaries", token, "Weekly summaries")
            .await?;

        response
            .weekly_summaries
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                serde_json::from_str(raw)
                    .map_err(|e| ApiError::Decode(format!("weekly summary {i}: {e}")))
            })
            .collect()
    }

    // ─── Preferences ─────────────────────────────────────────────────────

    /// Save training preferences. On success the cached profile's embedded
    /// preferences are patched in place and the cache timestamp refreshed.
    pub async fn save_preferences(&self, token: &str, preferences: &Preferences) -> Result<()> {
        let (status, body) = self
            .send(
                self.http
                    .post(self.url("preferences"))
                    .bearer_auth(token)
                    .json(preferences),
            )
            .await?;
        self.check_status(status, &body, "Preferences")?;

        let mut cache = self.profile_cache.write().await;
        if let Some(cached) = cache.as_mut() {
            cached.profile.preferences = preferences.clone();
            cached.fetched_at = Instant::now();
        }

        Ok(())
    }

    // ─── Auth & account ──────────────────────────────────────────────────

    /// Exchange the current bearer token for a fresh one.
    pub async fn refresh_token(&self, token: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct RefreshTokenResponse {
            jwt_token: Option<String>,
            message: Option<String>,
        }

        let response: RefreshTokenResponse = self
            .post_json_response("refresh-token", token, "Token")
            .await?;

        match response.jwt_token {
            Some(new_token) => Ok(new_token),
            None => Err(ApiError::TokenRefresh(
                response
                    .message
                    .unwrap_or_else(|| "Token refresh failed".to_string()),
            )),
        }
    }

    /// Trigger backend-side plan (re)generation for this user.
    pub async fn refresh_user(&self, token: &str) -> Result<()> {
        let (status, body) = self
            .send(self.http.post(self.url("refresh")).bearer_auth(token))
            .await?;
        self.check_status(status, &body, "User")?;
        Ok(())
    }

    /// Register a push-notification device token.
    pub async fn update_device_token(&self, token: &str, device_token: &str) -> Result<()> {
        let payload = serde_json::json!({ "device_token": device_token });
        let (status, body) = self
            .send(
                self.http
                    .post(self.url("device-token"))
                    .bearer_auth(token)
                    .json(&payload),
            )
            .await?;
        self.check_status(status, &body, "Device token")?;
        Ok(())
    }

    /// Set the user's email address.
    ///
    /// Auth is optional to support pre-auth onboarding: pass a bearer token
    /// when signed in, or a user id before a token exists.
    pub async fn update_email(
        &self,
        token: Option<&str>,
        user_id: Option<&str>,
        email: &str,
    ) -> Result<()> {
        let mut payload = serde_json::Map::new();
        payload.insert("email".to_string(), email.into());
        if let Some(token) = token {
            payload.insert("token".to_string(), token.into());
        }
        if let Some(user_id) = user_id {
            payload.insert("user_id".to_string(), user_id.into());
        }

        let (status, body) = self
            .send(self.http.post(self.url("email")).json(&payload))
            .await?;
        self.check_status(status, &body, "Email")?;
        Ok(())
    }

    // ─── Entitlement ─────────────────────────────────────────────────────

    /// Whether the user has an active premium subscription.
    pub async fn check_premium_status(&self, token: &str) -> Result<bool> {
        self.get_bool("premium", token, "Premium status").await
    }

    /// Whether the user is inside the free-trial window.
    pub async fn check_free_trial_status(&self, token: &str) -> Result<bool> {
        self.get_bool("free-trial", token, "Free trial status").await
    }

    /// Record the premium flag on the backend (purchase reconciliation).
    pub async fn update_premium_status(&self, token: &str, is_premium: bool) -> Result<()> {
        let (status, body) = self
            .send(
                self.http
                    .post(self.url("premium"))
                    .bearer_auth(token)
                    .json(&is_premium),
            )
            .await?;
        self.check_status(status, &body, "Premium status")?;
        Ok(())
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.base_url, endpoint)
    }

    /// Issue a request under the connection limiter.
    ///
    /// The body is consumed before the permit is released; a response whose
    /// body is still streaming holds a connection, so the limiter must
    /// cover it for the connection budget to hold.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(reqwest::StatusCode, String)> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| ApiError::InvalidRequest("client is shut down".to_string()))?;

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Request completed");
        Ok((status, body))
    }

    /// Map a non-2xx status to an endpoint-specific error.
    fn check_status(&self, status: reqwest::StatusCode, body: &str, what: &'static str) -> Result<()> {
        if status.is_success() {
            return Ok(());
        }

        tracing::warn!(status = %status, body = %body, what, "Request failed");

        let message = match status.as_u16() {
            401 => "Invalid or expired token".to_string(),
            403 => "Access forbidden".to_string(),
            404 => format!("{what} not found"),
            _ => format!("{what} request failed"),
        };

        Err(ApiError::Http { status, message })
    }

    /// Require a body, distinguishing "no body" from "wrong shape".
    fn require_body(body: String) -> Result<String> {
        if body.is_empty() {
            return Err(ApiError::EmptyResponse);
        }
        Ok(body)
    }

    /// Authenticated GET with a JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        token: &str,
        what: &'static str,
    ) -> Result<T> {
        let (status, body) = self
            .send(self.http.get(self.url(endpoint)).bearer_auth(token))
            .await?;
        self.check_status(status, &body, what)?;
        let body = Self::require_body(body)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Authenticated POST that decodes a JSON response body.
    async fn post_json_response<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        token: &str,
        what: &'static str,
    ) -> Result<T> {
        let (status, body) = self
            .send(self.http.post(self.url(endpoint)).bearer_auth(token))
            .await?;
        self.check_status(status, &body, what)?;
        let body = Self::require_body(body)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Boolean endpoints answer in one of two wire shapes: a bare boolean,
    /// or `{"is_in_trial": bool}`. Ordered fallback, boolean form first.
    async fn get_bool(&self, endpoint: &str, token: &str, what: &'static str) -> Result<bool> {
        #[derive(Deserialize)]
        struct WrappedFlag {
            is_in_trial: bool,
        }

        let (status, body) = self
            .send(self.http.get(self.url(endpoint)).bearer_auth(token))
            .await?;
        self.check_status(status, &body, what)?;
        let body = Self::require_body(body)?;

        if let Ok(flag) = serde_json::from_str::<bool>(&body) {
            return Ok(flag);
        }
        serde_json::from_str::<WrappedFlag>(&body)
            .map(|w| w.is_in_trial)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
