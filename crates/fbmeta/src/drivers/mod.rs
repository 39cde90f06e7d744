//! Database driver implementations.
//!
//! Each driver implements the connection traits from [`crate::core::traits`]:
//!
//! - [`firebird`]: Firebird over rsfbclient (feature `firebird`, on by default)
//!
//! Drivers are gated with a feature flag in `Cargo.toml` so the pure pipeline
//! can be built and tested without a client library.

#[cfg(feature = "firebird")]
pub mod firebird;

#[cfg(feature = "firebird")]
pub use firebird::{FirebirdConnection, FirebirdFactory};
