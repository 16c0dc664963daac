//! Utility functions for the wallet session core
//!
//! This module contains common utility functions used throughout the
//! session core.

use crate::shared::error::WalletError;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0))
        .as_secs()
}

/// Validate a wallet address produced by the generation/import collaborator
pub fn validate_address(address: &str) -> Result<(), WalletError> {
    if address.is_empty() {
        return Err(WalletError::validation("Wallet address cannot be empty"));
    }

    if address.chars().any(|c| c.is_whitespace()) {
        return Err(WalletError::validation("Wallet address cannot contain whitespace"));
    }

    Ok(())
}

/// Case-insensitive address comparison
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Shorten an address for display and log output
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 14 {
        return address.to_string();
    }
    format!("{}...{}", &address[..8], &address[address.len() - 6..])
}
