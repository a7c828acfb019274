// ABOUTME: HTTP request handlers for comments and bids
// ABOUTME: Posting is open while the request lives; edits are requester-only

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use bountyboard_core::Cents;
use bountyboard_notify::NotificationKind;
use bountyboard_requests::{Comment, CommentInput};

use crate::auth::CurrentUser;
use crate::fanout;
use crate::response::{ok, ApiResult};
use crate::state::DbState;

pub async fn add_comment(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CommentInput>,
) -> ApiResult<Comment> {
    let bid = Cents(input.bid_cents);
    let comment = db.requests.add_comment(&request_id, &user, input).await?;
    let request = db.requests.get_request(&request_id).await?;

    info!(
        "Comment {} added to request {} (bid {})",
        comment.id, request_id, bid
    );

    fanout::notify_watchers(
        &db,
        &request,
        &user.id,
        NotificationKind::RequestComment {
            request_id: request.id.clone(),
            request_title: request.title.clone(),
            commenter_name: user.name.clone(),
            bid_cents: Some(comment.bid_cents),
            bid_currency: comment.bid_currency,
        },
    )
    .await;

    ok(comment)
}

pub async fn edit_comment(
    State(db): State<DbState>,
    Path((request_id, comment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CommentInput>,
) -> ApiResult<Comment> {
    let comment = db
        .requests
        .edit_comment(&request_id, &comment_id, &user, input)
        .await?;
    ok(comment)
}

pub async fn delete_comment(
    State(db): State<DbState>,
    Path((request_id, comment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<()> {
    db.requests
        .delete_comment(&request_id, &comment_id, &user)
        .await?;
    ok(())
}
