//! # Tally Shared
//!
//! Request/response types for the Tally HTTP API.
//! Kept free of server dependencies so API clients can reuse them.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
