//! Domain types - windows, tiers, quota snapshots and posts.

mod account;
mod post;
mod quota;
mod tier;
mod window;

pub use account::AccountInfo;
pub use post::{MAX_POST_CHARS, PostText, PostTextError, PublishedPost};
pub use quota::{QuotaStatus, WindowStatus};
pub use tier::{Tier, TierLimits};
pub use window::Granularity;
