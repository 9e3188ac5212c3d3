// SPDX-License-Identifier: MIT

//! Purchase flow over the platform in-app-purchase capability.
//!
//! The platform store (product listing, purchase sheet, transaction
//! verification) is an opaque capability behind [`StorePlatform`]. This
//! module owns the state machine around it and the backend reconciliation
//! that actually grants premium:
//!
//! Idle -> Purchasing -> { Verifying -> Reconciling -> Complete }
//!                       | Cancelled | Pending | Failed
//!
//! Cancelled and Pending are terminal non-error outcomes distinct from
//! Failed. Every failure is reported with a specific [`StoreError`];
//! user-visible messaging is the caller's job.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::services::ApiClient;

/// A product as listed by the platform store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub display_name: String,
    pub display_price: String,
}

/// A platform transaction that passed or failed cryptographic verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified(Transaction),
    /// The platform returned a transaction it could not vouch for.
    Unverified,
}

/// Opaque record of a platform purchase transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub product_id: String,
}

/// Terminal result of asking the platform to purchase a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformPurchase {
    Success(Verification),
    Cancelled,
    Pending,
}

/// The platform in-app-purchase capability.
///
/// "Initiate purchase, receive verified/cancelled/pending outcome" - the
/// purchase UI and receipt cryptography live behind this seam.
#[async_trait]
pub trait StorePlatform: Send + Sync {
    /// List products for the given identifiers.
    async fn load_products(&self, ids: &[&str]) -> anyhow::Result<Vec<Product>>;

    /// Run the platform purchase flow for a product.
    async fn purchase(&self, product_id: &str) -> anyhow::Result<PlatformPurchase>;

    /// Mark a verified transaction as finished with the platform.
    async fn finish(&self, transaction: &Transaction) -> anyhow::Result<()>;
}

/// Where a purchase attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    Idle,
    Purchasing,
    Verifying,
    Reconciling,
    Complete,
    Cancelled,
    Pending,
    Failed,
}

/// Purchase errors. Never silently swallowed; the caller decides messaging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Transaction verification failed")]
    Verification,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Purchase was cancelled")]
    UserCancelled,

    #[error("Purchase is pending")]
    Pending,

    #[error("Failed to activate subscription: {0}")]
    BackendUpdate(#[source] ApiError),

    #[error("An unknown error occurred: {0}")]
    Unknown(#[from] anyhow::Error),
}

/// Drives a purchase attempt end to end: platform purchase, verification,
/// backend reconciliation, and the on-success callback.
pub struct StoreManager<P: StorePlatform> {
    platform: P,
    api: std::sync::Arc<ApiClient>,
    product_id: String,
    state: Mutex<PurchaseState>,
    products: Mutex<Vec<Product>>,
    /// Latched when a verified transaction could not be reconciled with
    /// the backend; cleared only by a successful [`StoreManager::reconcile`].
    needs_reconciliation: AtomicBool,
    /// Marker file mirroring the latch so it survives process restarts.
    reconciliation_file: Option<PathBuf>,
    on_success: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<P: StorePlatform> StoreManager<P> {
    pub fn new(platform: P, api: std::sync::Arc<ApiClient>, product_id: impl Into<String>) -> Self {
        Self {
            platform,
            api,
            product_id: product_id.into(),
            state: Mutex::new(PurchaseState::Idle),
            products: Mutex::new(Vec::new()),
            needs_reconciliation: AtomicBool::new(false),
            reconciliation_file: None,
            on_success: None,
        }
    }

    /// Mirror the reconciliation latch at `path` (e.g. next to the session
    /// file). An existing marker file seeds the latch, so a verified
    /// purchase whose backend update failed last run is retried via
    /// [`StoreManager::reconcile`] after a relaunch.
    pub fn persist_reconciliation_at(mut self, path: PathBuf) -> Self {
        self.needs_reconciliation
            .store(path.exists(), Ordering::SeqCst);
        self.reconciliation_file = Some(path);
        self
    }

    /// Register a callback fired exactly once per completed purchase
    /// (e.g. "show the success animation").
    pub fn on_success(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Current state of the purchase attempt.
    pub fn state(&self) -> PurchaseState {
        *self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Products loaded from the platform.
    pub fn products(&self) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether a verified transaction is still waiting for backend
    /// reconciliation (retry with [`StoreManager::reconcile`]).
    pub fn needs_reconciliation(&self) -> bool {
        self.needs_reconciliation.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: PurchaseState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }

    /// Update the latch and its on-disk mirror. File failures are logged,
    /// not fatal; the in-memory latch stays authoritative for this process.
    fn latch_reconciliation(&self, pending: bool) {
        self.needs_reconciliation.store(pending, Ordering::SeqCst);

        let Some(path) = &self.reconciliation_file else {
            return;
        };
        let result = if pending {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            fs::write(path, b"{}")
        } else if path.exists() {
            fs::remove_file(path)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to update reconciliation marker");
        }
    }

    /// Refresh the product list from the platform.
    pub async fn load_products(&self) -> Result<(), StoreError> {
        let products = self.platform.load_products(&[&self.product_id]).await?;
        tracing::debug!(count = products.len(), "Products loaded");
        *self
            .products
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = products;
        Ok(())
    }

    /// Run one purchase attempt for the known premium product.
    ///
    /// Reaches `Complete` only when verification succeeds AND the backend
    /// acknowledges the premium flag. A verified transaction whose backend
    /// update fails ends in `Failed` with the reconciliation flag latched.
    pub async fn purchase(&self, token: &str) -> Result<(), StoreError> {
        let product = self
            .products()
            .into_iter()
            .find(|p| p.id == self.product_id)
            .ok_or(StoreError::ProductNotFound)?;

        self.set_state(PurchaseState::Purchasing);
        tracing::info!(product = %product.id, "Starting purchase");

        let outcome = match self.platform.purchase(&product.id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.set_state(PurchaseState::Failed);
                return Err(StoreError::Unknown(e));
            }
        };

        let verification = match outcome {
            PlatformPurchase::Cancelled => {
                self.set_state(PurchaseState::Cancelled);
                tracing::info!("Purchase cancelled by user");
                return Err(StoreError::UserCancelled);
            }
            PlatformPurchase::Pending => {
                self.set_state(PurchaseState::Pending);
                tracing::info!("Purchase deferred by platform");
                return Err(StoreError::Pending);
            }
            PlatformPurchase::Success(verification) => verification,
        };

        self.set_state(PurchaseState::Verifying);
        let transaction = match verification {
            Verification::Unverified => {
                self.set_state(PurchaseState::Failed);
                tracing::warn!("Transaction failed verification");
                return Err(StoreError::Verification);
            }
            Verification::Verified(transaction) => transaction,
        };

        self.set_state(PurchaseState::Reconciling);
        if let Err(e) = self.api.update_premium_status(token, true).await {
            // The platform transaction is already verified; remember that
            // the backend still owes us the premium flag.
            self.latch_reconciliation(true);
            self.set_state(PurchaseState::Failed);
            tracing::warn!(error = %e, "Backend reconciliation failed");
            return Err(StoreError::BackendUpdate(e));
        }

        if let Err(e) = self.platform.finish(&transaction).await {
            tracing::warn!(error = %e, "Failed to finish transaction with platform");
        }
        if let Err(e) = self.load_products().await {
            tracing::warn!(error = %e, "Product reload after purchase failed");
        }

        self.set_state(PurchaseState::Complete);
        if let Some(callback) = &self.on_success {
            callback();
        }
        tracing::info!("Purchase complete");
        Ok(())
    }

    /// Retry backend reconciliation for a previously verified transaction
    /// (e.g. at next launch). No-op unless reconciliation is pending.
    pub async fn reconcile(&self, token: &str) -> Result<(), StoreError> {
        if !self.needs_reconciliation() {
            return Ok(());
        }

        self.api
            .update_premium_status(token, true)
            .await
            .map_err(StoreError::BackendUpdate)?;

        self.latch_reconciliation(false);
        self.set_state(PurchaseState::Complete);
        if let Some(callback) = &self.on_success {
            callback();
        }
        tracing::info!("Deferred reconciliation complete");
        Ok(())
    }
}
