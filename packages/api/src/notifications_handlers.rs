// ABOUTME: HTTP request handlers for the notification feed
// ABOUTME: Listing and read-state management, scoped to the owner

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use bountyboard_notify::Notification;

use crate::auth::CurrentUser;
use crate::response::{ok, ApiError, ApiResult};
use crate::state::DbState;
use crate::users_handlers::require_self_or_admin;

#[derive(Deserialize, Default)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
}

pub async fn list_notifications(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    require_self_or_admin(&caller, &user_id)?;
    let notifications = db.notifications.list_for_user(&user_id, query.unread).await?;
    ok(notifications)
}

pub async fn mark_notification_read(
    State(db): State<DbState>,
    Path((user_id, notification_id)): Path<(String, String)>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<()> {
    require_self_or_admin(&caller, &user_id)?;
    if !db.notifications.mark_read(&user_id, &notification_id).await? {
        return Err(ApiError::not_found("notification not found"));
    }
    ok(())
}

#[derive(serde::Serialize)]
pub struct MarkAllResponse {
    pub marked: u64,
}

pub async fn mark_all_notifications_read(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<MarkAllResponse> {
    require_self_or_admin(&caller, &user_id)?;
    let marked = db.notifications.mark_all_read(&user_id).await?;
    ok(MarkAllResponse { marked })
}
