// SPDX-License-Identifier: MIT

//! Premium/trial entitlement resolution.

use crate::error::Result;
use crate::services::ApiClient;

/// Resolved entitlement for a session. Derived, never persisted;
/// recomputed per resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementState {
    FreeTrial,
    Premium,
    NeedsPaywall,
}

impl EntitlementState {
    /// Whether the paywall should be shown for this entitlement.
    pub fn needs_paywall(&self) -> bool {
        matches!(self, EntitlementState::NeedsPaywall)
    }
}

/// Resolve the entitlement for the given token.
///
/// Sequential two-step check: the free-trial status is queried first and,
/// when true, short-circuits the resolution (the premium check is never
/// issued). Either check failing fails the whole resolution; callers keep
/// their prior entitlement state on failure.
pub async fn resolve(api: &ApiClient, token: &str) -> Result<EntitlementState> {
    if api.check_free_trial_status(token).await? {
        return Ok(EntitlementState::FreeTrial);
    }

    let state = if api.check_premium_status(token).await? {
        EntitlementState::Premium
    } else {
        EntitlementState::NeedsPaywall
    };

    tracing::debug!(?state, "Entitlement resolved");
    Ok(state)
}
