// ABOUTME: Typed notification events with exhaustive rendering
// ABOUTME: Adding a variant forces render and link to handle it

use bountyboard_core::{format_amount, Cents, Currency};
use serde::{Deserialize, Serialize};

/// Everything that can notify a user. Each variant carries the data its
/// message needs; rendering is exhaustive so no event can go unformatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    NewRequest {
        request_id: String,
        request_title: String,
        app_name: String,
    },
    RequestComment {
        request_id: String,
        request_title: String,
        commenter_name: String,
        bid_cents: Option<Cents>,
        bid_currency: Option<Currency>,
    },
    DeveloperAdded {
        request_id: String,
        request_title: String,
        developer_name: String,
    },
    DeveloperRemoved {
        request_id: String,
        request_title: String,
        developer_name: String,
    },
    RequestStatusChange {
        request_id: String,
        request_title: String,
        old_status: String,
        new_status: String,
    },
    RequestCompleted {
        request_id: String,
        request_title: String,
    },
    PaymentReceived {
        request_id: String,
        request_title: String,
        amount_cents: Cents,
        currency: Currency,
    },
}

impl NotificationKind {
    /// Stable code stored in the `kind` column, usable for filtering.
    pub fn code(&self) -> &'static str {
        match self {
            NotificationKind::NewRequest { .. } => "new_request",
            NotificationKind::RequestComment { .. } => "request_comment",
            NotificationKind::DeveloperAdded { .. } => "developer_added",
            NotificationKind::DeveloperRemoved { .. } => "developer_removed",
            NotificationKind::RequestStatusChange { .. } => "request_status_change",
            NotificationKind::RequestCompleted { .. } => "request_completed",
            NotificationKind::PaymentReceived { .. } => "payment_received",
        }
    }

    /// Human-readable message for digests and the notification feed.
    pub fn render(&self) -> String {
        match self {
            NotificationKind::NewRequest {
                request_title,
                app_name,
                ..
            } => {
                format!("New feature request for {}: \"{}\"", app_name, request_title)
            }
            NotificationKind::RequestComment {
                request_title,
                commenter_name,
                bid_cents,
                bid_currency,
                ..
            } => match (bid_cents, bid_currency) {
                (Some(amount), Some(currency)) if !amount.is_zero() => format!(
                    "{} bid {} on \"{}\"",
                    commenter_name,
                    format_amount(*amount, *currency),
                    request_title
                ),
                _ => format!("{} commented on \"{}\"", commenter_name, request_title),
            },
            NotificationKind::DeveloperAdded {
                request_title,
                developer_name,
                ..
            } => format!("{} started working on \"{}\"", developer_name, request_title),
            NotificationKind::DeveloperRemoved {
                request_title,
                developer_name,
                ..
            } => format!(
                "{} is no longer working on \"{}\"",
                developer_name, request_title
            ),
            NotificationKind::RequestStatusChange {
                request_title,
                old_status,
                new_status,
                ..
            } => format!(
                "\"{}\" moved from {} to {}",
                request_title, old_status, new_status
            ),
            NotificationKind::RequestCompleted { request_title, .. } => format!(
                "\"{}\" is complete and waiting for your confirmation",
                request_title
            ),
            NotificationKind::PaymentReceived {
                request_title,
                amount_cents,
                currency,
                ..
            } => format!(
                "You received {} for \"{}\"",
                format_amount(*amount_cents, *currency),
                request_title
            ),
        }
    }

    /// Where clicking the notification should land.
    pub fn link(&self) -> String {
        match self {
            NotificationKind::NewRequest { request_id, .. }
            | NotificationKind::RequestComment { request_id, .. }
            | NotificationKind::DeveloperAdded { request_id, .. }
            | NotificationKind::DeveloperRemoved { request_id, .. }
            | NotificationKind::RequestStatusChange { request_id, .. }
            | NotificationKind::RequestCompleted { request_id, .. }
            | NotificationKind::PaymentReceived { request_id, .. } => {
                format!("/requests/{}", request_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bid_comment_renders_amount() {
        let kind = NotificationKind::RequestComment {
            request_id: "req-1".to_string(),
            request_title: "Dark mode".to_string(),
            commenter_name: "Alice".to_string(),
            bid_cents: Some(Cents(2500)),
            bid_currency: Some(Currency::Cad),
        };
        assert_eq!(kind.render(), "Alice bid $25.00 CAD on \"Dark mode\"");
        assert_eq!(kind.link(), "/requests/req-1");
        assert_eq!(kind.code(), "request_comment");
    }

    #[test]
    fn test_zero_bid_renders_as_plain_comment() {
        let kind = NotificationKind::RequestComment {
            request_id: "req-1".to_string(),
            request_title: "Dark mode".to_string(),
            commenter_name: "Alice".to_string(),
            bid_cents: Some(Cents(0)),
            bid_currency: None,
        };
        assert_eq!(kind.render(), "Alice commented on \"Dark mode\"");
    }

    #[test]
    fn test_round_trips_through_json() {
        let kind = NotificationKind::PaymentReceived {
            request_id: "req-9".to_string(),
            request_title: "CSV export".to_string(),
            amount_cents: Cents(50_000),
            currency: Currency::Usd,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"payment_received\""));
        let back: NotificationKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}
