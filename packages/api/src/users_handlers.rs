// ABOUTME: HTTP request handlers for user accounts
// ABOUTME: Account creation, payment-account linking, and preferences

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use bountyboard_accounts::{User, UserCreateInput, UserRole};
use bountyboard_core::Currency;

use crate::auth::CurrentUser;
use crate::response::{ok, ApiError, ApiResult};
use crate::state::DbState;

pub async fn create_user(
    State(db): State<DbState>,
    Json(input): Json<UserCreateInput>,
) -> ApiResult<User> {
    if input.name.trim().is_empty() || input.email.trim().is_empty() {
        return Err(ApiError::bad_request("name and email are required"));
    }
    info!("Creating user: {}", input.email);
    let user = db.users.create_user(input).await?;
    ok(user)
}

pub async fn get_user(State(db): State<DbState>, Path(user_id): Path<String>) -> ApiResult<User> {
    let user = db.users.get_user(&user_id).await?;
    ok(user)
}

#[derive(Deserialize)]
pub struct StripeAccountBody {
    /// None disconnects the account.
    #[serde(rename = "stripeAccountId")]
    pub stripe_account_id: Option<String>,
}

pub async fn set_stripe_account(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    Json(body): Json<StripeAccountBody>,
) -> ApiResult<User> {
    require_self_or_admin(&caller, &user_id)?;
    let user = db
        .users
        .set_stripe_account(&user_id, body.stripe_account_id.as_deref())
        .await?;
    ok(user)
}

#[derive(Deserialize)]
pub struct CurrencyBody {
    pub currency: Currency,
}

pub async fn set_preferred_currency(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
    CurrentUser(caller): CurrentUser,
    Json(body): Json<CurrencyBody>,
) -> ApiResult<User> {
    require_self_or_admin(&caller, &user_id)?;
    let user = db
        .users
        .set_preferred_currency(&user_id, body.currency)
        .await?;
    ok(user)
}

pub(crate) fn require_self_or_admin(caller: &User, user_id: &str) -> Result<(), ApiError> {
    if caller.id == user_id || caller.role == UserRole::Admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("not allowed for another user's account"))
    }
}
