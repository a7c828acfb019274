// ABOUTME: Notification subsystem: typed events, storage, debounced digests
// ABOUTME: Delivery mechanics live behind the NotificationSender trait

pub mod kind;
pub mod scheduler;
pub mod sender;
pub mod storage;

#[cfg(test)]
mod storage_test;

pub use kind::NotificationKind;
pub use scheduler::DebounceScheduler;
pub use sender::{LogSender, NotificationSender};
pub use storage::{Notification, NotificationStorage};
