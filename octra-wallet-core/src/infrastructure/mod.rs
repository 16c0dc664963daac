//! Infrastructure layer - storage backends and external integrations
//!
//! This module contains the storage backends and the remote endpoint
//! client consumed by the session core.

pub mod network;
pub mod platform;

// Re-export infrastructure components
pub use network::*;
pub use platform::*;
