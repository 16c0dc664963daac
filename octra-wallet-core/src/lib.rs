//! Octra Wallet Core
//!
//! Session and state core for the Octra web wallet. Keeps the multi-wallet
//! session consistent across the popup and expanded presentation surfaces.
//!
//! ## Architecture
//!
//! - **Core**: wallet collection store, account data cache, refresh
//!   scheduling
//! - **Domain**: wallet identity records
//! - **Infrastructure**: storage backends and the chain query endpoint
//! - **Shared**: common types, constants, and utilities
//!
//! The two presentation surfaces consume one [`SessionCore`] owned by the
//! process root; they differ only in which storage backend the core binds.
//! When the popup binds extension storage and the expanded view binds
//! browser-local storage, each surface owns an independent replica of the
//! session; the backends are not cross-synchronized.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Re-export main modules for easy access
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use crate::infrastructure::network::ChainClient;
use crate::infrastructure::platform::{ExtensionStorageAdapter, LocalStorageAdapter};
use crate::shared::constants::{
    DEFAULT_ENDPOINT_URL, ENV_ENDPOINT_URL, ENV_REFRESH_DELAY_MS, ENV_STORAGE_DIR,
    ENV_SURFACE_MODE, POST_TX_REFRESH_DELAY_MS,
};

// Re-export specific components
pub use crate::core::account::{AccountDataCache, AccountSnapshot};
pub use crate::core::refresh::RefreshScheduler;
pub use crate::core::session::SessionStore;
pub use crate::infrastructure::network::AccountEndpoint;
pub use crate::infrastructure::platform::{MemoryStorageAdapter, StorageAdapter};

// Re-export domain entities and shared types
pub use crate::domain::entities::{Credential, WalletRecord};
pub use crate::shared::error::WalletError;
pub use crate::shared::types::{
    BalanceSnapshot, FetchState, SurfaceMode, Theme, TransactionRecord, TransactionStatus,
    TxDirection, WalletResult,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initialize logging
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::try_init()?;
    Ok(())
}

/// Session configuration resolved from the environment or defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint_url: String,
    pub surface: SurfaceMode,
    pub storage_dir: Option<PathBuf>,
    pub refresh_delay: Duration,
}

impl SessionConfig {
    /// Read configuration from .env / environment with safe defaults.
    ///
    /// Keys: OCTRA_WALLET_ENDPOINT_URL, OCTRA_WALLET_SURFACE_MODE,
    ///       OCTRA_WALLET_STORAGE_DIR, OCTRA_WALLET_REFRESH_DELAY_MS
    pub fn from_env() -> Self {
        dotenv().ok();

        let endpoint_url =
            env::var(ENV_ENDPOINT_URL).unwrap_or_else(|_| DEFAULT_ENDPOINT_URL.to_string());
        let surface = SurfaceMode::parse(
            &env::var(ENV_SURFACE_MODE).unwrap_or_else(|_| "popup".to_string()),
        );
        let storage_dir = env::var(ENV_STORAGE_DIR).ok().map(PathBuf::from);
        let refresh_delay_ms = env::var(ENV_REFRESH_DELAY_MS)
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(POST_TX_REFRESH_DELAY_MS);

        Self {
            endpoint_url,
            surface,
            storage_dir,
            refresh_delay: Duration::from_millis(refresh_delay_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            surface: SurfaceMode::Popup,
            storage_dir: None,
            refresh_delay: Duration::from_millis(POST_TX_REFRESH_DELAY_MS),
        }
    }
}

/// Process root owning the session state.
///
/// Both presentation surfaces hold a reference to one instance; every
/// collection mutation keeps the account cache and the refresh scheduler
/// consistent with it.
pub struct SessionCore {
    pub session: Arc<SessionStore>,
    pub accounts: Arc<AccountDataCache>,
    pub scheduler: RefreshScheduler,
}

impl SessionCore {
    /// Wire a core from explicitly injected collaborators.
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        endpoint: Arc<dyn AccountEndpoint>,
        config: &SessionConfig,
    ) -> Self {
        let session = Arc::new(SessionStore::new(storage));
        let accounts = Arc::new(AccountDataCache::new(endpoint));
        let scheduler = RefreshScheduler::new(accounts.clone(), config.refresh_delay);

        Self {
            session,
            accounts,
            scheduler,
        }
    }

    /// Wire a core from the environment: the popup surface binds the
    /// extension-scoped backend, the expanded surface binds browser-local
    /// storage.
    pub fn from_env() -> WalletResult<Self> {
        let config = SessionConfig::from_env();

        let storage: Arc<dyn StorageAdapter> = match (config.surface, &config.storage_dir) {
            (SurfaceMode::Popup, Some(dir)) => {
                Arc::new(ExtensionStorageAdapter::with_dir(dir.clone()))
            }
            (SurfaceMode::Popup, None) => Arc::new(ExtensionStorageAdapter::new()),
            (SurfaceMode::Expanded, Some(dir)) => {
                Arc::new(LocalStorageAdapter::with_dir(dir.clone()))
            }
            (SurfaceMode::Expanded, None) => Arc::new(LocalStorageAdapter::new()),
        };

        let endpoint = Arc::new(ChainClient::new(&config.endpoint_url)?);
        Ok(Self::new(storage, endpoint, &config))
    }

    /// Restore the persisted session and start fetching account data for
    /// the restored active wallet.
    pub async fn load_session(&self) -> WalletResult<(Vec<WalletRecord>, Option<WalletRecord>)> {
        let (wallets, active) = self.session.load().await?;
        if let Some(active) = &active {
            self.accounts.activate(&active.address).await;
        }
        Ok((wallets, active))
    }

    /// Add a wallet (idempotent on address) and make it the active one.
    pub async fn add_wallet(&self, wallet: WalletRecord) -> WalletResult<()> {
        let address = wallet.address.clone();
        let previous = self.session.active_wallet().await;

        self.session.add(wallet).await?;

        if let Some(previous) = previous {
            if previous.address != address {
                self.scheduler.cancel(&previous.address).await;
            }
        }
        self.accounts.activate(&address).await;
        Ok(())
    }

    /// Switch the active wallet.
    pub async fn switch_wallet(&self, address: &str) -> WalletResult<WalletRecord> {
        let previous = self.session.active_wallet().await;
        let wallet = self.session.switch_to(address).await?;

        if let Some(previous) = previous {
            if previous.address != wallet.address {
                self.scheduler.cancel(&previous.address).await;
            }
        }
        self.accounts.activate(&wallet.address).await;
        Ok(wallet)
    }

    /// Remove a wallet. Returns the active wallet after the removal.
    pub async fn remove_wallet(&self, address: &str) -> WalletResult<Option<WalletRecord>> {
        let previous = self.session.active_wallet().await;
        let active = self.session.remove(address).await?;

        self.scheduler.cancel(address).await;

        let removed_active = previous.map(|w| w.address == address).unwrap_or(false);
        if removed_active {
            match &active {
                Some(promoted) => self.accounts.activate(&promoted.address).await,
                None => self.accounts.deactivate().await,
            }
        }
        Ok(active)
    }

    /// Drop the whole session: wallets, active pointer, cached account
    /// data, and any pending reconciliation.
    pub async fn disconnect(&self) -> WalletResult<()> {
        self.scheduler.cancel_all().await;
        self.session.disconnect_all().await?;
        self.accounts.deactivate().await;
        Ok(())
    }

    /// Called by the submission collaborator after a transaction was
    /// accepted; schedules the delayed reconciliation pass.
    pub async fn transaction_submitted(&self, address: &str) {
        self.scheduler.after_transaction_submitted(address).await;
    }

    pub async fn refresh_balance(&self) {
        self.accounts.refresh_balance().await;
    }

    pub async fn refresh_history(&self) {
        self.accounts.refresh_history().await;
    }

    pub async fn account_snapshot(&self) -> Option<AccountSnapshot> {
        self.accounts.snapshot().await
    }

    pub async fn theme(&self) -> WalletResult<Theme> {
        self.session.theme().await
    }

    pub async fn set_theme(&self, theme: Theme) -> WalletResult<()> {
        self.session.set_theme(theme).await
    }
}
