// ABOUTME: HTTP request handlers for feature requests
// ABOUTME: Listing, creation with duplicate check, lifecycle, and confirmation

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use bountyboard_accounts::UserRole;
use bountyboard_core::{convert, format_amount, Currency};
use bountyboard_notify::NotificationKind;
use bountyboard_payments::ConfirmOutcome;
use bountyboard_requests::{
    Comment, FeatureRequest, RequestCreateInput, RequestDeveloper, RequestStatus,
    RequestUpdateInput, RemovedBy, SimilarRequest,
};

use crate::auth::CurrentUser;
use crate::fanout;
use crate::pagination::{PaginatedResponse, PaginationParams};
use crate::response::{ok, ApiError, ApiResult};
use crate::state::DbState;

/// Base currency the cached totals are denominated in.
const LEDGER_CURRENCY: Currency = Currency::Cad;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
    #[serde(rename = "appId")]
    pub app_id: Option<String>,
    /// Display currency for the converted total.
    pub currency: Option<Currency>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: FeatureRequest,
    /// Total converted to the viewer's currency, formatted for display.
    #[serde(rename = "displayTotal")]
    pub display_total: String,
}

fn to_view(request: FeatureRequest, currency: Currency) -> RequestView {
    let converted = convert(request.total_bid_cents, LEDGER_CURRENCY, currency);
    RequestView {
        display_total: format_amount(converted, currency),
        request,
    }
}

pub async fn list_requests(
    State(db): State<DbState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<RequestView>> {
    let status = query.status.unwrap_or(RequestStatus::Requested);
    let currency = query.currency.unwrap_or_default();

    let (requests, total) = db
        .requests
        .list_by_status(
            status,
            query.app_id.as_deref(),
            query.pagination.limit(),
            query.pagination.offset(),
        )
        .await?;

    let views: Vec<RequestView> = requests
        .into_iter()
        .map(|r| to_view(r, currency))
        .collect();
    ok(PaginatedResponse::new(views, &query.pagination, total))
}

#[derive(Deserialize)]
pub struct CreateRequestBody {
    #[serde(flatten)]
    pub input: RequestCreateInput,
    /// Create even when similar open requests exist.
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize)]
pub struct CreateRequestResponse {
    /// None when similar requests were found and `force` was not set.
    pub request: Option<FeatureRequest>,
    pub similar: Vec<SimilarRequest>,
}

/// Create a feature request, first checking for likely duplicates among the
/// app's open requests. A match blocks creation until the caller retries
/// with `force`.
pub async fn create_request(
    State(db): State<DbState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateRequestBody>,
) -> ApiResult<CreateRequestResponse> {
    let app = db.apps.get_app(&body.input.app_id).await?;

    let similar = db
        .requests
        .similar_candidates(
            &body.input.app_id,
            &body.input.title,
            &body.input.body,
            db.settings.similar_threshold,
            db.settings.similar_max_results,
        )
        .await?;
    if !similar.is_empty() && !body.force {
        info!(
            "Request creation held: {} similar open requests for '{}'",
            similar.len(),
            body.input.title
        );
        return ok(CreateRequestResponse {
            request: None,
            similar,
        });
    }

    let request = db.requests.create_request(&user, body.input).await?;

    fanout::notify_developers(
        &db,
        &user.id,
        NotificationKind::NewRequest {
            request_id: request.id.clone(),
            request_title: request.title.clone(),
            app_name: app.display_name,
        },
    )
    .await;

    ok(CreateRequestResponse {
        request: Some(request),
        similar: Vec::new(),
    })
}

#[derive(Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: FeatureRequest,
    pub comments: Vec<Comment>,
    pub developers: Vec<RequestDeveloper>,
    #[serde(rename = "confirmationCount")]
    pub confirmation_count: i64,
}

pub async fn get_request(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
) -> ApiResult<RequestDetail> {
    let request = db.requests.get_request(&request_id).await?;
    let comments = db.requests.list_comments(&request_id).await?;
    let developers = db.requests.list_developers(&request_id, true).await?;
    let confirmation_count = db.requests.confirmation_count(&request_id).await?;

    ok(RequestDetail {
        request,
        comments,
        developers,
        confirmation_count,
    })
}

/// Update type, category, or projected date. Active developers and admins only.
pub async fn update_request(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RequestUpdateInput>,
) -> ApiResult<FeatureRequest> {
    require_developer_or_admin(&db, &request_id, &user).await?;
    let request = db.requests.update_request(&request_id, input).await?;
    ok(request)
}

#[derive(Deserialize)]
pub struct SetStatusBody {
    pub status: RequestStatus,
    #[serde(rename = "projectedCompletionDate")]
    pub projected_completion_date: Option<DateTime<Utc>>,
}

pub async fn set_status(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<SetStatusBody>,
) -> ApiResult<FeatureRequest> {
    require_developer_or_admin(&db, &request_id, &user).await?;

    let before = db.requests.get_request(&request_id).await?;
    let request = db
        .requests
        .set_status(&request_id, body.status, body.projected_completion_date)
        .await?;

    if before.status != request.status {
        let kind = if request.status == RequestStatus::Completed {
            NotificationKind::RequestCompleted {
                request_id: request.id.clone(),
                request_title: request.title.clone(),
            }
        } else {
            NotificationKind::RequestStatusChange {
                request_id: request.id.clone(),
                request_title: request.title.clone(),
                old_status: before.status.as_str().to_string(),
                new_status: request.status.as_str().to_string(),
            }
        };
        fanout::notify_watchers(&db, &request, &user.id, kind).await;
    }

    ok(request)
}

pub async fn add_developer(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<RequestDeveloper> {
    let link = db.requests.add_developer(&request_id, &user).await?;
    let request = db.requests.get_request(&request_id).await?;

    fanout::notify_watchers(
        &db,
        &request,
        &user.id,
        NotificationKind::DeveloperAdded {
            request_id: request.id.clone(),
            request_title: request.title.clone(),
            developer_name: user.name.clone(),
        },
    )
    .await;

    ok(link)
}

#[derive(Deserialize, Default)]
pub struct RemoveDeveloperQuery {
    /// Admin removal of someone else; defaults to self-removal.
    #[serde(rename = "developerId")]
    pub developer_id: Option<String>,
}

pub async fn remove_developer(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RemoveDeveloperQuery>,
) -> ApiResult<()> {
    let (target_id, removed_by) = match query.developer_id {
        Some(target) if target != user.id => {
            if user.role != UserRole::Admin {
                return Err(ApiError::forbidden(
                    "only admins can remove another developer",
                ));
            }
            (target, RemovedBy::Admin)
        }
        _ => (user.id.clone(), RemovedBy::SelfRemoval),
    };

    let target = db.users.get_user(&target_id).await?;
    db.requests
        .remove_developer(&request_id, &target_id, removed_by)
        .await?;
    let request = db.requests.get_request(&request_id).await?;

    fanout::notify_watchers(
        &db,
        &request,
        &user.id,
        NotificationKind::DeveloperRemoved {
            request_id: request.id.clone(),
            request_title: request.title.clone(),
            developer_name: target.name,
        },
    )
    .await;

    ok(())
}

/// Confirm a completed request. When the bidder quorum is reached this
/// settles: bidders are charged and developers paid.
pub async fn confirm_request(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ConfirmOutcome> {
    let outcome = db.settlement.confirm_request(&request_id, &user).await?;

    if let ConfirmOutcome::Settled(_) = &outcome {
        let request = db.requests.get_request(&request_id).await?;
        let ratios = db.ratios.list(&request_id).await?;
        for ratio in &ratios {
            let payout = request
                .total_bid_cents
                .percent_hundredths((ratio.ratio_percentage * 100.0).round() as i64);
            if let Ok(dev) = db.users.get_user(&ratio.developer_id).await {
                fanout::notify_user(
                    &db,
                    &dev.id,
                    NotificationKind::PaymentReceived {
                        request_id: request.id.clone(),
                        request_title: request.title.clone(),
                        amount_cents: payout,
                        currency: dev.preferred_currency,
                    },
                )
                .await;
            }
        }
        fanout::notify_watchers(
            &db,
            &request,
            &user.id,
            NotificationKind::RequestStatusChange {
                request_id: request.id.clone(),
                request_title: request.title.clone(),
                old_status: "completed".to_string(),
                new_status: "confirmed".to_string(),
            },
        )
        .await;
    }

    ok(outcome)
}

pub(crate) async fn require_developer_or_admin(
    db: &DbState,
    request_id: &str,
    user: &bountyboard_accounts::User,
) -> Result<(), ApiError> {
    if user.role == UserRole::Admin {
        return Ok(());
    }
    if db.requests.is_active_developer(request_id, &user.id).await? {
        return Ok(());
    }
    Err(ApiError::forbidden(
        "only an active developer on this request may do that",
    ))
}
