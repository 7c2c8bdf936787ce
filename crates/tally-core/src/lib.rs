//! # Tally Core
//!
//! The domain layer of the Tally post relay.
//! Calendar windows, tier limits, post validation and the quota gate live here;
//! storage and the upstream posting client are reached through ports.

pub mod domain;
pub mod error;
pub mod gate;
pub mod ports;

pub use error::QuotaExceeded;
pub use gate::QuotaGate;
