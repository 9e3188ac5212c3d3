// SPDX-License-Identifier: MIT

//! Services module - the client's working parts.

pub mod api;
pub mod entitlement;
pub mod onboarding;
pub mod session;
pub mod store;

pub use api::ApiClient;
pub use entitlement::EntitlementState;
pub use onboarding::{OnboardingError, OnboardingFlow, OnboardingStep};
pub use session::{AuthMethod, Session, SessionStatus, SessionStore};
pub use store::{
    PlatformPurchase, Product, PurchaseState, StoreError, StoreManager, StorePlatform,
    Transaction, Verification,
};
