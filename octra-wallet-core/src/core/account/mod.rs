//! Per-wallet account data cache
//!
//! This module caches balance/nonce and transaction history for the active
//! wallet. The two halves are independent state machines: a failed balance
//! fetch never blocks or invalidates a successful history fetch, and each
//! can be refreshed on its own. Results from a fetch that outlived its
//! wallet (the user switched away mid-flight) are discarded.

use crate::infrastructure::network::AccountEndpoint;
use crate::shared::types::{
    Address, BalanceSnapshot, FetchState, TransactionRecord, WalletResult, WireTransaction,
};
use crate::shared::utils::truncate_address;
use std::sync::Arc;
use tokio::sync::RwLock;

/// View of the cache handed to the presentation surfaces.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub owner: Address,
    pub balance: FetchState<BalanceSnapshot>,
    pub history: FetchState<Vec<TransactionRecord>>,
}

struct AccountState {
    owner: Address,
    balance: FetchState<BalanceSnapshot>,
    history: FetchState<Vec<TransactionRecord>>,
}

pub struct AccountDataCache {
    endpoint: Arc<dyn AccountEndpoint>,
    state: RwLock<Option<AccountState>>,
}

impl AccountDataCache {
    pub fn new(endpoint: Arc<dyn AccountEndpoint>) -> Self {
        Self {
            endpoint,
            state: RwLock::new(None),
        }
    }

    /// Make `owner` the cached wallet and fetch both halves concurrently.
    ///
    /// Called on initial load, add, and switch. Any previously cached
    /// wallet is discarded first.
    pub async fn activate(&self, owner: &str) {
        {
            let mut state = self.state.write().await;
            *state = Some(AccountState {
                owner: owner.to_string(),
                balance: FetchState::Loading,
                history: FetchState::Loading,
            });
        }

        let (balance, history) = tokio::join!(
            self.endpoint.fetch_balance(owner),
            self.endpoint.transaction_history(owner)
        );

        self.commit_balance(owner, balance).await;
        self.commit_history(owner, history).await;
    }

    /// Drop the cached wallet (removal or disconnect).
    pub async fn deactivate(&self) {
        let mut state = self.state.write().await;
        *state = None;
    }

    /// Re-fetch balance and nonce for the cached wallet, leaving the
    /// history sub-state untouched.
    pub async fn refresh_balance(&self) {
        let owner = {
            let mut state = self.state.write().await;
            match state.as_mut() {
                Some(account) => {
                    account.balance = FetchState::Loading;
                    account.owner.clone()
                }
                None => return,
            }
        };

        let result = self.endpoint.fetch_balance(&owner).await;
        self.commit_balance(&owner, result).await;
    }

    /// Re-fetch the transaction history for the cached wallet, leaving the
    /// balance sub-state untouched.
    pub async fn refresh_history(&self) {
        let owner = {
            let mut state = self.state.write().await;
            match state.as_mut() {
                Some(account) => {
                    account.history = FetchState::Loading;
                    account.owner.clone()
                }
                None => return,
            }
        };

        let result = self.endpoint.transaction_history(&owner).await;
        self.commit_history(&owner, result).await;
    }

    /// Post-transaction reconciliation pass for `owner`.
    ///
    /// Best-effort: a failed fetch is logged and the previous value is put
    /// back rather than surfacing an error state. A pass targeting a wallet
    /// that is no longer cached is a no-op.
    pub async fn reconcile(&self, owner: &str) {
        let previous = {
            let mut state = self.state.write().await;
            match state.as_mut() {
                Some(account) if account.owner == owner => {
                    let prev = (account.balance.clone(), account.history.clone());
                    account.balance = FetchState::Loading;
                    account.history = FetchState::Loading;
                    prev
                }
                _ => {
                    log::debug!(
                        "Skipping reconciliation for inactive wallet {}",
                        truncate_address(owner)
                    );
                    return;
                }
            }
        };

        let (balance, history) = tokio::join!(
            self.endpoint.fetch_balance(owner),
            self.endpoint.transaction_history(owner)
        );

        let mut state = self.state.write().await;
        let account = match state.as_mut() {
            Some(account) if account.owner == owner => account,
            _ => return,
        };

        match balance {
            Ok(snapshot) => account.balance = FetchState::Ready(snapshot),
            Err(err) => {
                log::warn!(
                    "Reconciliation balance fetch failed for {}: {}",
                    truncate_address(owner),
                    err
                );
                account.balance = previous.0;
            }
        }

        match history {
            Ok(wires) => account.history = FetchState::Ready(Self::tag_history(owner, wires)),
            Err(err) => {
                log::warn!(
                    "Reconciliation history fetch failed for {}: {}",
                    truncate_address(owner),
                    err
                );
                account.history = previous.1;
            }
        }
    }

    /// Cloned view of the cache, or None when no wallet is active.
    pub async fn snapshot(&self) -> Option<AccountSnapshot> {
        let state = self.state.read().await;
        state.as_ref().map(|account| AccountSnapshot {
            owner: account.owner.clone(),
            balance: account.balance.clone(),
            history: account.history.clone(),
        })
    }

    async fn commit_balance(&self, owner: &str, result: WalletResult<BalanceSnapshot>) {
        let mut state = self.state.write().await;
        let account = match state.as_mut() {
            Some(account) if account.owner == owner => account,
            _ => {
                log::debug!(
                    "Discarding stale balance result for {}",
                    truncate_address(owner)
                );
                return;
            }
        };

        account.balance = match result {
            Ok(snapshot) => FetchState::Ready(snapshot),
            Err(err) => {
                log::error!(
                    "Balance fetch failed for {}: {}",
                    truncate_address(owner),
                    err
                );
                FetchState::Failed(err.to_string())
            }
        };
    }

    async fn commit_history(&self, owner: &str, result: WalletResult<Vec<WireTransaction>>) {
        let mut state = self.state.write().await;
        let account = match state.as_mut() {
            Some(account) if account.owner == owner => account,
            _ => {
                log::debug!(
                    "Discarding stale history result for {}",
                    truncate_address(owner)
                );
                return;
            }
        };

        account.history = match result {
            Ok(wires) => FetchState::Ready(Self::tag_history(owner, wires)),
            Err(err) => {
                log::error!(
                    "History fetch failed for {}: {}",
                    truncate_address(owner),
                    err
                );
                FetchState::Failed(err.to_string())
            }
        };
    }

    fn tag_history(owner: &str, wires: Vec<WireTransaction>) -> Vec<TransactionRecord> {
        wires
            .into_iter()
            .map(|tx| TransactionRecord::tag(tx, owner))
            .collect()
    }
}
