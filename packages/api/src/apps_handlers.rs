// ABOUTME: HTTP request handlers for registered apps
// ABOUTME: App CRUD plus voluntary tips from users or guests

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;

use bountyboard_accounts::{App, AppCreateInput};
use bountyboard_core::{Cents, Currency};
use bountyboard_payments::PaymentTransaction;
use bountyboard_storage::StorageError;

use crate::auth::USER_ID_HEADER;
use crate::response::{ok, ApiError, ApiResult};
use crate::state::DbState;

pub async fn list_apps(State(db): State<DbState>) -> ApiResult<Vec<App>> {
    let apps = db.apps.list_apps().await?;
    ok(apps)
}

pub async fn create_app(
    State(db): State<DbState>,
    Json(input): Json<AppCreateInput>,
) -> ApiResult<App> {
    if input.name.trim().is_empty() {
        return Err(ApiError::bad_request("app name cannot be empty"));
    }
    if db.apps.get_app_by_name(&input.name).await?.is_some() {
        return Err(ApiError::bad_request("an app with this name already exists"));
    }

    info!("Creating app: {}", input.name);
    let app = db.apps.create_app(input).await?;
    ok(app)
}

pub async fn get_app(State(db): State<DbState>, Path(app_id): Path<String>) -> ApiResult<App> {
    let app = db.apps.get_app(&app_id).await?;
    ok(app)
}

#[derive(Deserialize)]
pub struct TipRequest {
    #[serde(rename = "amountCents")]
    pub amount_cents: i64,
    pub currency: Currency,
    /// Required when no authenticated user sends the tip.
    #[serde(rename = "guestEmail")]
    pub guest_email: Option<String>,
}

/// Record a tip toward an app. Works for signed-in users (x-user-id header)
/// and guests alike; guests must leave an email for the receipt.
pub async fn tip_app(
    State(db): State<DbState>,
    Path(app_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<TipRequest>,
) -> ApiResult<PaymentTransaction> {
    if request.amount_cents <= 0 {
        return Err(ApiError::bad_request("tip amount must be positive"));
    }
    db.apps.get_app(&app_id).await?;

    // Resolve the header to a real user so the ledger row never points at a
    // user that does not exist.
    let user = match headers.get(USER_ID_HEADER).and_then(|value| value.to_str().ok()) {
        Some(user_id) => match db.users.get_user(user_id).await {
            Ok(user) => Some(user),
            Err(StorageError::NotFound) => {
                return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Unknown user"))
            }
            Err(err) => return Err(err.into()),
        },
        None => None,
    };
    if user.is_none() && request.guest_email.is_none() {
        return Err(ApiError::bad_request(
            "guest tips require a guestEmail for the receipt",
        ));
    }

    info!(
        "Recording tip of {} {} for app {}",
        Cents(request.amount_cents),
        request.currency,
        app_id
    );

    let tip = db
        .transactions
        .record_tip(
            &app_id,
            user.as_ref().map(|u| u.id.as_str()),
            request.guest_email.as_deref(),
            Cents(request.amount_cents),
            request.currency,
            None,
        )
        .await?;
    ok(tip)
}
