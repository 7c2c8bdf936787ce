//! Post publishers - the X API client and a dry-run fallback.

mod dry_run;

pub use dry_run::DryRunPublisher;

#[cfg(feature = "x-api")]
mod x_api;
#[cfg(feature = "x-api")]
pub use self::x_api::{XApiConfig, XApiPublisher};
