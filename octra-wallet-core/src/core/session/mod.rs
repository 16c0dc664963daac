//! Wallet collection store
//!
//! This module owns the ordered list of known wallets and the active-wallet
//! pointer, write-through persisted into an injected storage backend. The
//! persistence write is issued before the in-memory update, both under one
//! held write lock, so a concurrent reader never observes memory ahead of
//! storage.

use crate::domain::entities::WalletRecord;
use crate::infrastructure::platform::StorageAdapter;
use crate::shared::constants::{ACTIVE_WALLET_KEY, THEME_KEY, WALLETS_KEY};
use crate::shared::error::WalletError;
use crate::shared::types::{Address, Theme, WalletResult};
use crate::shared::utils::truncate_address;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct SessionState {
    wallets: Vec<WalletRecord>,
    active: Option<Address>,
}

/// Multi-wallet session store.
///
/// Insertion order is display order, and the first remaining element in
/// insertion order is always the automatic choice whenever an active wallet
/// has to be picked (stale pointer on load, removal of the active wallet).
pub struct SessionStore {
    storage: Arc<dyn StorageAdapter>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Load the persisted collection and resolve the active wallet.
    ///
    /// A stored pointer that no longer matches any wallet falls back to the
    /// first wallet in insertion order; the load itself never fails over a
    /// missing or stale pointer. Empty storage yields an empty collection
    /// and no active wallet.
    pub async fn load(&self) -> WalletResult<(Vec<WalletRecord>, Option<WalletRecord>)> {
        let mut state = self.state.write().await;

        let stored = self.storage.get(&[WALLETS_KEY, ACTIVE_WALLET_KEY]).await?;

        let wallets: Vec<WalletRecord> = match stored.get(WALLETS_KEY) {
            Some(raw) => serde_json::from_slice(raw)?,
            None => Vec::new(),
        };

        let stored_pointer: Option<Address> = match stored.get(ACTIVE_WALLET_KEY) {
            Some(raw) => serde_json::from_slice(raw).ok(),
            None => None,
        };

        let active = if wallets.is_empty() {
            None
        } else {
            match stored_pointer {
                Some(pointer) if wallets.iter().any(|w| w.address == pointer) => Some(pointer),
                Some(pointer) => {
                    log::warn!(
                        "Stored active pointer {} is stale, falling back to first wallet",
                        truncate_address(&pointer)
                    );
                    Some(wallets[0].address.clone())
                }
                None => Some(wallets[0].address.clone()),
            }
        };

        state.wallets = wallets;
        state.active = active;

        let active_wallet = Self::resolve_active(&state);
        log::info!("Session loaded: {} wallet(s)", state.wallets.len());
        Ok((state.wallets.clone(), active_wallet))
    }

    /// Add a wallet and make it active.
    ///
    /// Re-adding an existing address is not an error: the collection is left
    /// unchanged and the active pointer switches to the existing entry.
    pub async fn add(&self, wallet: WalletRecord) -> WalletResult<()> {
        let mut state = self.state.write().await;

        if state.wallets.iter().any(|w| w.address == wallet.address) {
            log::debug!(
                "Wallet {} already present, switching to it",
                truncate_address(&wallet.address)
            );
            self.persist_active(&wallet.address).await?;
            state.active = Some(wallet.address);
            return Ok(());
        }

        let mut updated = state.wallets.clone();
        updated.push(wallet.clone());

        let mut entries = HashMap::new();
        entries.insert(WALLETS_KEY.to_string(), serde_json::to_vec(&updated)?);
        entries.insert(
            ACTIVE_WALLET_KEY.to_string(),
            serde_json::to_vec(&wallet.address)?,
        );
        self.storage.set(entries).await?;

        log::info!("Added wallet {}", truncate_address(&wallet.address));
        state.wallets = updated;
        state.active = Some(wallet.address);
        Ok(())
    }

    /// Switch the active pointer to an existing wallet.
    pub async fn switch_to(&self, address: &str) -> WalletResult<WalletRecord> {
        let mut state = self.state.write().await;

        let wallet = state
            .wallets
            .iter()
            .find(|w| w.address == address)
            .cloned()
            .ok_or_else(|| WalletError::wallet_not_found(address))?;

        self.persist_active(&wallet.address).await?;
        state.active = Some(wallet.address.clone());

        log::info!("Switched to wallet {}", truncate_address(&wallet.address));
        Ok(wallet)
    }

    /// Remove a wallet from the collection.
    ///
    /// Removing the sole remaining wallet is rejected; that path is
    /// `disconnect_all`. If the removed wallet was active, the first
    /// remaining wallet in insertion order is promoted, and the removal and
    /// the pointer update are persisted as one transition. Returns the
    /// active wallet after the removal.
    pub async fn remove(&self, address: &str) -> WalletResult<Option<WalletRecord>> {
        let mut state = self.state.write().await;

        let index = state
            .wallets
            .iter()
            .position(|w| w.address == address)
            .ok_or_else(|| WalletError::wallet_not_found(address))?;

        if state.wallets.len() == 1 {
            return Err(WalletError::last_wallet(
                "You cannot remove the last wallet. Use disconnect instead.",
            ));
        }

        let mut updated = state.wallets.clone();
        updated.remove(index);

        let mut entries = HashMap::new();
        entries.insert(WALLETS_KEY.to_string(), serde_json::to_vec(&updated)?);

        let removed_active = state.active.as_deref() == Some(address);
        let new_active = if removed_active {
            let promoted = updated[0].address.clone();
            entries.insert(
                ACTIVE_WALLET_KEY.to_string(),
                serde_json::to_vec(&promoted)?,
            );
            Some(promoted)
        } else {
            state.active.clone()
        };

        self.storage.set(entries).await?;

        log::info!("Removed wallet {}", truncate_address(address));
        state.wallets = updated;
        state.active = new_active;
        Ok(Self::resolve_active(&state))
    }

    /// Drop every wallet and the active pointer. The only operation allowed
    /// to empty the collection. The theme preference is reset to its
    /// default afterwards.
    pub async fn disconnect_all(&self) -> WalletResult<()> {
        let mut state = self.state.write().await;

        self.storage.clear().await?;

        let mut entries = HashMap::new();
        entries.insert(THEME_KEY.to_string(), serde_json::to_vec(&Theme::Dark)?);
        self.storage.set(entries).await?;

        log::info!("Disconnected all wallets");
        *state = SessionState::default();
        Ok(())
    }

    /// Snapshot of the collection in insertion order.
    pub async fn wallets(&self) -> Vec<WalletRecord> {
        self.state.read().await.wallets.clone()
    }

    /// The currently active wallet, if any.
    pub async fn active_wallet(&self) -> Option<WalletRecord> {
        Self::resolve_active(&*self.state.read().await)
    }

    pub async fn has_wallets(&self) -> bool {
        !self.state.read().await.wallets.is_empty()
    }

    /// Persisted theme preference, defaulting to dark.
    pub async fn theme(&self) -> WalletResult<Theme> {
        let stored = self.storage.get(&[THEME_KEY]).await?;
        match stored.get(THEME_KEY) {
            Some(raw) => Ok(serde_json::from_slice(raw).unwrap_or_default()),
            None => Ok(Theme::default()),
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> WalletResult<()> {
        let mut entries = HashMap::new();
        entries.insert(THEME_KEY.to_string(), serde_json::to_vec(&theme)?);
        self.storage.set(entries).await
    }

    async fn persist_active(&self, address: &str) -> WalletResult<()> {
        let mut entries = HashMap::new();
        entries.insert(ACTIVE_WALLET_KEY.to_string(), serde_json::to_vec(address)?);
        self.storage.set(entries).await
    }

    fn resolve_active(state: &SessionState) -> Option<WalletRecord> {
        let pointer = state.active.as_deref()?;
        state.wallets.iter().find(|w| w.address == pointer).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Credential;
    use crate::infrastructure::platform::MemoryStorageAdapter;

    fn wallet(address: &str) -> WalletRecord {
        WalletRecord::new(address, Credential::new(format!("seed for {}", address)))
            .expect("Failed to create test wallet")
    }

    fn store() -> (Arc<MemoryStorageAdapter>, SessionStore) {
        let adapter = Arc::new(MemoryStorageAdapter::new());
        let store = SessionStore::new(adapter.clone());
        (adapter, store)
    }

    #[tokio::test]
    async fn test_load_empty_storage() {
        let (_, store) = store();
        let (wallets, active) = store.load().await.expect("Failed to load");

        assert!(wallets.is_empty());
        assert!(active.is_none());
    }

    #[tokio::test]
    async fn test_add_sets_active_and_persists() {
        let (adapter, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");

        // A fresh store over the same backend sees the same session
        let reloaded = SessionStore::new(adapter);
        let (wallets, active) = reloaded.load().await.expect("Failed to load");

        assert_eq!(wallets.len(), 1);
        assert_eq!(active.expect("Missing active wallet").address, "oct1aaa");
    }

    #[tokio::test]
    async fn test_add_duplicate_switches_instead_of_inserting() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");
        store.add(wallet("oct1aaa")).await.expect("Failed to re-add");

        let wallets = store.wallets().await;
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].address, "oct1aaa");
        assert_eq!(wallets[1].address, "oct1bbb");

        let active = store.active_wallet().await.expect("Missing active wallet");
        assert_eq!(active.address, "oct1aaa");
    }

    #[tokio::test]
    async fn test_switch_unknown_address_fails_and_changes_nothing() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");

        let result = store.switch_to("oct1ghost").await;
        assert!(matches!(result, Err(WalletError::WalletNotFound(_))));

        assert_eq!(store.wallets().await.len(), 1);
        let active = store.active_wallet().await.expect("Missing active wallet");
        assert_eq!(active.address, "oct1aaa");
    }

    #[tokio::test]
    async fn test_remove_active_promotes_first_remaining() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");
        store.add(wallet("oct1ccc")).await.expect("Failed to add");

        // Make the middle wallet active, then remove it
        store.switch_to("oct1bbb").await.expect("Failed to switch");
        let new_active = store
            .remove("oct1bbb")
            .await
            .expect("Failed to remove")
            .expect("Expected an active wallet after removal");

        assert_eq!(new_active.address, "oct1aaa");
        let wallets = store.wallets().await;
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].address, "oct1aaa");
        assert_eq!(wallets[1].address, "oct1ccc");
    }

    #[tokio::test]
    async fn test_remove_non_active_keeps_active_pointer() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");

        let active = store
            .remove("oct1aaa")
            .await
            .expect("Failed to remove")
            .expect("Expected an active wallet after removal");

        assert_eq!(active.address, "oct1bbb");
    }

    #[tokio::test]
    async fn test_remove_last_wallet_fails() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");

        let result = store.remove("oct1aaa").await;
        assert!(matches!(result, Err(WalletError::LastWallet(_))));
        assert_eq!(store.wallets().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_address_fails() {
        let (_, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");

        let result = store.remove("oct1ghost").await;
        assert!(matches!(result, Err(WalletError::WalletNotFound(_))));
        assert_eq!(store.wallets().await.len(), 2);
    }

    #[tokio::test]
    async fn test_disconnect_then_load_is_empty() {
        let (adapter, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");

        store.disconnect_all().await.expect("Failed to disconnect");

        let reloaded = SessionStore::new(adapter);
        let (wallets, active) = reloaded.load().await.expect("Failed to load");
        assert!(wallets.is_empty());
        assert!(active.is_none());

        // Theme is reset to the default on disconnect
        let theme = reloaded.theme().await.expect("Failed to read theme");
        assert_eq!(theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_pointer() {
        let (adapter, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");
        store.add(wallet("oct1ccc")).await.expect("Failed to add");
        store.switch_to("oct1bbb").await.expect("Failed to switch");

        let reloaded = SessionStore::new(adapter);
        let (wallets, active) = reloaded.load().await.expect("Failed to load");

        let addresses: Vec<&str> = wallets.iter().map(|w| w.address.as_str()).collect();
        assert_eq!(addresses, vec!["oct1aaa", "oct1bbb", "oct1ccc"]);
        assert_eq!(active.expect("Missing active wallet").address, "oct1bbb");
    }

    #[tokio::test]
    async fn test_stale_pointer_falls_back_to_first_wallet() {
        let (adapter, store) = store();
        store.add(wallet("oct1aaa")).await.expect("Failed to add");
        store.add(wallet("oct1bbb")).await.expect("Failed to add");

        // Invalidate the pointer behind the store's back
        let mut entries = HashMap::new();
        entries.insert(
            ACTIVE_WALLET_KEY.to_string(),
            serde_json::to_vec("oct1gone").expect("Failed to encode pointer"),
        );
        adapter.set(entries).await.expect("Failed to corrupt pointer");

        let reloaded = SessionStore::new(adapter);
        let (_, active) = reloaded.load().await.expect("Failed to load");
        assert_eq!(active.expect("Missing active wallet").address, "oct1aaa");
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let (_, store) = store();
        assert_eq!(store.theme().await.expect("Failed to read theme"), Theme::Dark);

        store.set_theme(Theme::Light).await.expect("Failed to set theme");
        assert_eq!(store.theme().await.expect("Failed to read theme"), Theme::Light);
    }

    // The full session lifecycle in one pass
    #[tokio::test]
    async fn test_session_scenario() {
        let (_, store) = store();
        let (wallets, active) = store.load().await.expect("Failed to load");
        assert!(wallets.is_empty());
        assert!(active.is_none());
        assert!(!store.has_wallets().await);

        store.add(wallet("oct1aaa")).await.expect("Failed to add A");
        assert!(store.has_wallets().await);
        assert_eq!(store.active_wallet().await.expect("no active").address, "oct1aaa");

        store.add(wallet("oct1bbb")).await.expect("Failed to add B");
        assert_eq!(store.active_wallet().await.expect("no active").address, "oct1bbb");
        assert_eq!(store.wallets().await.len(), 2);

        store.switch_to("oct1aaa").await.expect("Failed to switch");
        assert_eq!(store.active_wallet().await.expect("no active").address, "oct1aaa");
        let addresses: Vec<String> = store
            .wallets()
            .await
            .iter()
            .map(|w| w.address.clone())
            .collect();
        assert_eq!(addresses, vec!["oct1aaa", "oct1bbb"]);

        store.remove("oct1aaa").await.expect("Failed to remove A");
        assert_eq!(store.active_wallet().await.expect("no active").address, "oct1bbb");
        assert_eq!(store.wallets().await.len(), 1);

        let result = store.remove("oct1bbb").await;
        assert!(matches!(result, Err(WalletError::LastWallet(_))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Whatever sequence of adds arrives, addresses stay unique and
            // the latest-added (or re-added) wallet is active.
            #[test]
            fn prop_add_never_duplicates(addresses in proptest::collection::vec("oct1[a-f0-9]{4}", 1..12)) {
                let rt = tokio::runtime::Runtime::new().expect("Failed to build runtime");
                rt.block_on(async {
                    let (_, store) = store();
                    for address in &addresses {
                        store.add(wallet(address)).await.expect("Failed to add");
                    }

                    let wallets = store.wallets().await;
                    let mut seen = std::collections::HashSet::new();
                    for w in &wallets {
                        assert!(seen.insert(w.address.clone()), "duplicate address in collection");
                    }

                    let expected_len = addresses.iter().collect::<std::collections::HashSet<_>>().len();
                    assert_eq!(wallets.len(), expected_len);

                    let active = store.active_wallet().await.expect("Missing active wallet");
                    assert_eq!(&active.address, addresses.last().expect("empty sequence"));
                });
            }
        }
    }
}
