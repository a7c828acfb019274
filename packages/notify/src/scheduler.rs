// ABOUTME: Per-user notification debouncing
// ABOUTME: Each new event resets the user's window; expired queues drain as one digest

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::kind::NotificationKind;
use crate::sender::NotificationSender;

const SWEEP_INTERVAL_SECS: u64 = 60;

struct PendingQueue {
    expires_at: DateTime<Utc>,
    items: Vec<NotificationKind>,
}

/// Batches notifications per user so a burst of activity produces one digest.
///
/// Owned by the application state and shared by handle; constructed once in
/// `main` and injected wherever notifications are raised.
pub struct DebounceScheduler {
    window: Duration,
    queues: Mutex<HashMap<String, PendingQueue>>,
}

impl DebounceScheduler {
    pub fn new(window_minutes: i64) -> Self {
        Self {
            window: Duration::minutes(window_minutes),
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Queue an event for a user, pushing their digest out by a full window.
    pub fn enqueue(&self, user_id: &str, kind: NotificationKind) {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let queue = queues.entry(user_id.to_string()).or_insert(PendingQueue {
            expires_at: Utc::now() + self.window,
            items: Vec::new(),
        });
        queue.expires_at = Utc::now() + self.window;
        queue.items.push(kind);
        debug!("Queued notification for {} ({} pending)", user_id, queue.items.len());
    }

    /// Remove and return every queue whose window has passed as of `now`.
    pub fn take_expired(&self, now: DateTime<Utc>) -> Vec<(String, Vec<NotificationKind>)> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let expired: Vec<String> = queues
            .iter()
            .filter(|(_, queue)| queue.expires_at <= now)
            .map(|(user_id, _)| user_id.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|user_id| {
                queues
                    .remove(&user_id)
                    .map(|queue| (user_id, queue.items))
            })
            .collect()
    }

    pub fn pending_users(&self) -> usize {
        self.queues.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Sweep loop: drains expired queues once a minute and hands each to the
    /// sender. Runs until the process exits.
    pub async fn run(self: Arc<Self>, sender: Arc<dyn NotificationSender>) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            for (user_id, items) in self.take_expired(Utc::now()) {
                sender.send_digest(&user_id, &items).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(title: &str) -> NotificationKind {
        NotificationKind::RequestCompleted {
            request_id: "req-1".to_string(),
            request_title: title.to_string(),
        }
    }

    #[test]
    fn test_nothing_expires_inside_the_window() {
        let scheduler = DebounceScheduler::new(30);
        scheduler.enqueue("usr-a", event("one"));

        assert!(scheduler.take_expired(Utc::now()).is_empty());
        assert_eq!(scheduler.pending_users(), 1);
    }

    #[test]
    fn test_expired_queue_drains_once() {
        let scheduler = DebounceScheduler::new(30);
        scheduler.enqueue("usr-a", event("one"));
        scheduler.enqueue("usr-a", event("two"));

        let later = Utc::now() + Duration::minutes(31);
        let drained = scheduler.take_expired(later);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, "usr-a");
        assert_eq!(drained[0].1.len(), 2);

        // Already taken; nothing left.
        assert!(scheduler.take_expired(later).is_empty());
        assert_eq!(scheduler.pending_users(), 0);
    }

    #[test]
    fn test_new_event_resets_the_window() {
        let scheduler = DebounceScheduler::new(30);
        scheduler.enqueue("usr-a", event("one"));

        // 20 minutes in, another event lands; 15 minutes after that the
        // original window would have expired but the reset keeps it pending.
        let at_20 = Utc::now() + Duration::minutes(20);
        assert!(scheduler.take_expired(at_20).is_empty());
        scheduler.enqueue("usr-a", event("two"));

        let at_35 = Utc::now() + Duration::minutes(35);
        // Window now ends ~30 minutes after the second enqueue (~minute 30+),
        // so minute 35 drains it, but minute 29 would not.
        let at_29 = Utc::now() + Duration::minutes(29);
        assert!(scheduler.take_expired(at_29).is_empty());
        let drained = scheduler.take_expired(at_35);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].1.len(), 2);
    }

    #[test]
    fn test_users_drain_independently() {
        let scheduler = DebounceScheduler::new(30);
        scheduler.enqueue("usr-a", event("one"));

        std::thread::sleep(std::time::Duration::from_millis(50));
        scheduler.enqueue("usr-b", event("two"));

        // Pick a time after a's window but before b's.
        let cutoff = Utc::now() + Duration::minutes(30) - Duration::milliseconds(25);
        let drained = scheduler.take_expired(cutoff);
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, "usr-a");
        assert_eq!(scheduler.pending_users(), 1);
    }
}
