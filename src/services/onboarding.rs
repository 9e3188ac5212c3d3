// SPDX-License-Identifier: MIT

//! Onboarding wizard: email capture -> optional race setup -> plan
//! generation.
//!
//! Linear and forward-only; the only shortcut is explicitly skipping race
//! setup. Each step is gated on the previous one's success, and a failed
//! step leaves the wizard exactly where it was so the user can retry.

use std::sync::Mutex;

use validator::ValidateEmail;

use crate::error::ApiError;
use crate::models::Preferences;
use crate::services::{ApiClient, SessionStatus, SessionStore};

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Email,
    RaceSetup,
    Generating,
    Done,
}

/// Onboarding failures, surfaced for user-facing messaging.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// Local format check failed; no network call was made.
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// Neither a bearer token nor a user id is available.
    #[error("No token found")]
    NotAuthenticated,

    /// The step being driven is not the wizard's current step.
    #[error("Onboarding step not available yet")]
    OutOfOrder,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Drives the onboarding sequence and the session transitions the
/// presentation layer observes.
pub struct OnboardingFlow<'a> {
    api: &'a ApiClient,
    session: &'a SessionStore,
    step: Mutex<OnboardingStep>,
}

impl<'a> OnboardingFlow<'a> {
    pub fn new(api: &'a ApiClient, session: &'a SessionStore) -> Self {
        Self {
            api,
            session,
            step: Mutex::new(OnboardingStep::Email),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        *self
            .step
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_step(&self, step: OnboardingStep) {
        *self
            .step
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = step;
    }

    fn require_step(&self, expected: OnboardingStep) -> Result<(), OnboardingError> {
        if self.step() == expected {
            Ok(())
        } else {
            Err(OnboardingError::OutOfOrder)
        }
    }

    /// Step 1: validate and submit the email address.
    ///
    /// The format is checked locally before any network call. Submits with
    /// the bearer token when one exists, falling back to the user id for
    /// pre-auth flows. On success the wizard advances to race setup; on
    /// failure it stays here.
    pub async fn submit_email(&self, email: &str) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::Email)?;

        if !email.validate_email() {
            return Err(OnboardingError::InvalidEmail);
        }

        let token = self.session.token();
        let user_id = self.session.user_id();
        if token.is_none() && user_id.is_none() {
            return Err(OnboardingError::NotAuthenticated);
        }

        self.api
            .update_email(token.as_deref(), user_id.as_deref(), email)
            .await?;

        tracing::info!("Onboarding email saved");
        self.set_step(OnboardingStep::RaceSetup);
        Ok(())
    }

    /// Step 2 (optional): save race details and per-day preferences.
    ///
    /// On success the session enters `GeneratingPlan` and the wizard moves
    /// to the generation step.
    pub async fn save_race_setup(&self, preferences: &Preferences) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::RaceSetup)?;

        let token = self.session.token().ok_or(OnboardingError::NotAuthenticated)?;
        self.api.save_preferences(&token, preferences).await?;

        self.session.set_status(SessionStatus::GeneratingPlan);
        self.set_step(OnboardingStep::Generating);
        Ok(())
    }

    /// Step 2 (skip): go straight to plan generation.
    pub fn skip_race_setup(&self) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::RaceSetup)?;

        self.session.set_status(SessionStatus::GeneratingPlan);
        self.set_step(OnboardingStep::Generating);
        Ok(())
    }

    /// Step 3: trigger backend plan generation.
    ///
    /// Success moves the session to `LoggedIn` and finishes the wizard.
    /// Failure surfaces the error and leaves both the session (still
    /// `GeneratingPlan`) and the wizard unchanged so the user may retry.
    pub async fn complete(&self) -> Result<(), OnboardingError> {
        self.require_step(OnboardingStep::Generating)?;

        let token = self.session.token().ok_or(OnboardingError::NotAuthenticated)?;
        self.api.refresh_user(&token).await?;

        self.session.set_status(SessionStatus::LoggedIn);
        self.set_step(OnboardingStep::Done);
        tracing::info!("Onboarding complete");
        Ok(())
    }
}
