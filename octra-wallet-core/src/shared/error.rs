//! Error handling for the wallet session core
//!
//! This module defines the error types used throughout the session core.

use thiserror::Error;

/// Wallet error type
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Cannot remove the last wallet: {0}")]
    LastWallet(String),

    #[error("Endpoint error: {0}")]
    Endpoint(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Wallet generation failed: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Create a storage unavailable error
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// Create a wallet not found error
    pub fn wallet_not_found(message: impl Into<String>) -> Self {
        Self::WalletNotFound(message.into())
    }

    /// Create a last wallet error
    pub fn last_wallet(message: impl Into<String>) -> Self {
        Self::LastWallet(message.into())
    }

    /// Create an endpoint error
    pub fn endpoint(message: impl Into<String>) -> Self {
        Self::Endpoint(message.into())
    }

    /// Create an invalid credential error
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

// Standard library error conversions
impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::storage_unavailable(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage_unavailable(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

// Network error conversions
impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::endpoint(format!("Request timed out: {}", err))
        } else {
            Self::endpoint(format!("Request failed: {}", err))
        }
    }
}
