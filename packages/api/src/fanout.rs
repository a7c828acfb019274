// ABOUTME: Notification fan-out for request activity
// ABOUTME: Persists each notification and queues it for the debounced digest

use std::collections::HashSet;

use tracing::warn;

use bountyboard_accounts::UserRole;
use bountyboard_notify::NotificationKind;
use bountyboard_requests::FeatureRequest;

use crate::state::DbState;

/// Notify everyone watching a request: the creator, active developers, and
/// every bidder, minus the actor. Notification failures are logged, never
/// surfaced, so a broken feed cannot fail the triggering operation.
pub async fn notify_watchers(
    state: &DbState,
    request: &FeatureRequest,
    actor_id: &str,
    kind: NotificationKind,
) {
    let mut recipients: HashSet<String> = HashSet::new();
    if let Some(creator_id) = &request.creator_id {
        recipients.insert(creator_id.clone());
    }

    match state.requests.bidder_aggregates(&request.id).await {
        Ok(aggregates) => {
            recipients.extend(aggregates.into_iter().map(|a| a.user_id));
        }
        Err(err) => warn!("Fan-out could not load bidders for {}: {}", request.id, err),
    }
    match state.requests.list_developers(&request.id, true).await {
        Ok(developers) => {
            recipients.extend(developers.into_iter().map(|d| d.developer_id));
        }
        Err(err) => warn!(
            "Fan-out could not load developers for {}: {}",
            request.id, err
        ),
    }

    recipients.remove(actor_id);
    deliver(state, recipients, kind).await;
}

/// Notify every developer account, used when a new request opens.
pub async fn notify_developers(state: &DbState, actor_id: &str, kind: NotificationKind) {
    let recipients: HashSet<String> = match state.users.list_users().await {
        Ok(users) => users
            .into_iter()
            .filter(|u| u.role == UserRole::Dev && u.id != actor_id)
            .map(|u| u.id)
            .collect(),
        Err(err) => {
            warn!("Fan-out could not list developers: {}", err);
            return;
        }
    };
    deliver(state, recipients, kind).await;
}

/// Notify one user directly.
pub async fn notify_user(state: &DbState, user_id: &str, kind: NotificationKind) {
    deliver(state, HashSet::from([user_id.to_string()]), kind).await;
}

async fn deliver(state: &DbState, recipients: HashSet<String>, kind: NotificationKind) {
    for user_id in recipients {
        if let Err(err) = state.notifications.notify(&user_id, &kind).await {
            warn!("Failed to store notification for {}: {}", user_id, err);
            continue;
        }
        state.scheduler.enqueue(&user_id, kind.clone());
    }
}
