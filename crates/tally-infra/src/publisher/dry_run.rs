//! Dry-run publisher - used when no upstream credentials are configured.
//!
//! Posts are logged and acknowledged with a generated id; nothing leaves the
//! process.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use tally_core::domain::{AccountInfo, PostText, PublishedPost};
use tally_core::ports::{PostPublisher, PublishError};

pub struct DryRunPublisher {
    published: AtomicUsize,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self {
            published: AtomicUsize::new(0),
        }
    }

    /// Number of posts acknowledged so far.
    pub fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for DryRunPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostPublisher for DryRunPublisher {
    async fn publish(&self, text: &PostText) -> Result<PublishedPost, PublishError> {
        let published = self.published.fetch_add(1, Ordering::Relaxed) + 1;

        let post = PublishedPost {
            id: format!("dry-run-{}", Uuid::new_v4()),
            text: text.as_str().to_string(),
            created_at: chrono::Utc::now(),
        };

        tracing::info!(
            post_id = %post.id,
            text_length = text.char_count(),
            preview = %text.preview(),
            published,
            "Dry run: post not sent upstream"
        );

        Ok(post)
    }

    async fn account(&self) -> Result<AccountInfo, PublishError> {
        Ok(AccountInfo {
            id: "0".to_string(),
            username: "dry-run".to_string(),
            name: "Dry Run".to_string(),
        })
    }
}
