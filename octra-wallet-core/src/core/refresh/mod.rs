//! Post-transaction refresh scheduling
//!
//! The remote ledger does not push confirmation events, so after a locally
//! submitted transaction a single reconciliation pass is scheduled after a
//! short fixed delay to catch settlement. At most one pass is pending per
//! wallet: a newer submission supersedes the pending one, and switching
//! away from or removing a wallet cancels it.

use crate::core::account::AccountDataCache;
use crate::shared::types::Address;
use crate::shared::utils::truncate_address;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

pub struct RefreshScheduler {
    cache: Arc<AccountDataCache>,
    delay: Duration,
    pending: Mutex<HashMap<Address, JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<AccountDataCache>, delay: Duration) -> Self {
        Self {
            cache,
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule one reconciliation pass for `address` after the configured
    /// delay. A pass already pending for the same wallet is superseded.
    /// Failures inside the pass are swallowed by the cache; this is
    /// best-effort background work, not a user-initiated refresh.
    pub async fn after_transaction_submitted(&self, address: &str) {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, handle| !handle.is_finished());

        if let Some(handle) = pending.remove(address) {
            log::debug!(
                "Superseding pending reconciliation for {}",
                truncate_address(address)
            );
            handle.abort();
        }

        let cache = self.cache.clone();
        let owner = address.to_string();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log::debug!(
                "Running post-transaction reconciliation for {}",
                truncate_address(&owner)
            );
            cache.reconcile(&owner).await;
        });

        pending.insert(address.to_string(), handle);
    }

    /// Cancel the pending pass for one wallet (switched away or removed).
    pub async fn cancel(&self, address: &str) {
        let mut pending = self.pending.lock().await;
        if let Some(handle) = pending.remove(address) {
            log::debug!(
                "Cancelled pending reconciliation for {}",
                truncate_address(address)
            );
            handle.abort();
        }
    }

    /// Cancel every pending pass (disconnect).
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}
