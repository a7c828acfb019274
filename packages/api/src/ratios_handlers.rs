// ABOUTME: HTTP request handlers for payout ratio negotiation
// ABOUTME: Developers propose, discuss, and accept the split of a payout

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use bountyboard_payments::{PaymentRatio, RatioInput, RatioMessage};

use crate::auth::CurrentUser;
use crate::requests_handlers::require_developer_or_admin;
use crate::response::{ok, ApiResult};
use crate::state::DbState;

/// Read the ratios for a request, materializing the default even split the
/// first time developers look at them.
pub async fn get_ratios(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
) -> ApiResult<Vec<PaymentRatio>> {
    db.requests.get_request(&request_id).await?;
    let developer_ids: Vec<String> = db
        .requests
        .list_developers(&request_id, true)
        .await?
        .into_iter()
        .map(|d| d.developer_id)
        .collect();

    let ratios = db
        .ratios
        .ensure_default_ratios(&request_id, &developer_ids)
        .await?;
    ok(ratios)
}

#[derive(Deserialize)]
pub struct SetRatiosBody {
    pub ratios: Vec<RatioInput>,
}

pub async fn set_ratios(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SetRatiosBody>,
) -> ApiResult<Vec<PaymentRatio>> {
    require_developer_or_admin(&db, &request_id, &user).await?;

    info!("Rewriting payout ratios for request {}", request_id);
    let ratios = db.ratios.set_ratios(&request_id, &body.ratios).await?;
    ok(ratios)
}

/// Accept the caller's own share of the current split.
pub async fn accept_ratio(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<PaymentRatio> {
    require_developer_or_admin(&db, &request_id, &user).await?;
    let ratio = db.ratios.accept_ratio(&request_id, &user.id).await?;
    ok(ratio)
}

#[derive(Deserialize)]
pub struct RatioMessageBody {
    pub message: String,
}

pub async fn post_ratio_message(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RatioMessageBody>,
) -> ApiResult<RatioMessage> {
    require_developer_or_admin(&db, &request_id, &user).await?;
    let message = db
        .ratios
        .add_message(&request_id, &user.id, &body.message)
        .await?;
    ok(message)
}

pub async fn list_ratio_messages(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
) -> ApiResult<Vec<RatioMessage>> {
    let messages = db.ratios.list_messages(&request_id).await?;
    ok(messages)
}
