//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod counter_store;
mod publisher;
mod rate_limit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter_store::CounterStore;
pub use publisher::{PostPublisher, PublishError};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
