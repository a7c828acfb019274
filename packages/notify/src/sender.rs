// ABOUTME: Digest delivery abstraction
// ABOUTME: The default sender logs digests; real transports implement the trait

use async_trait::async_trait;
use tracing::info;

use crate::kind::NotificationKind;

/// Delivers a batch of notifications to one user after the debounce window
/// closes. Failures are the implementation's to report; the scheduler drops
/// the queue either way so a user is never double-sent.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_digest(&self, user_id: &str, items: &[NotificationKind]);
}

/// Logs each digest line. Stands in until a real transport is wired up.
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send_digest(&self, user_id: &str, items: &[NotificationKind]) {
        info!("Digest for {} ({} items)", user_id, items.len());
        for item in items {
            info!("  [{}] {}", user_id, item.render());
        }
    }
}
