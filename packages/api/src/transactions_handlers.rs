// ABOUTME: HTTP request handlers for the payment transaction ledger
// ABOUTME: Read-only views; the ledger itself is append-only

use axum::extract::{Path, State};

use bountyboard_payments::PaymentTransaction;

use crate::auth::CurrentUser;
use crate::response::{ok, ApiResult};
use crate::state::DbState;
use crate::users_handlers::require_self_or_admin;

pub async fn list_user_transactions(
    State(db): State<DbState>,
    Path(user_id): Path<String>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<Vec<PaymentTransaction>> {
    require_self_or_admin(&caller, &user_id)?;
    let transactions = db.transactions.list_for_user(&user_id).await?;
    ok(transactions)
}

pub async fn list_request_transactions(
    State(db): State<DbState>,
    Path(request_id): Path<String>,
) -> ApiResult<Vec<PaymentTransaction>> {
    db.requests.get_request(&request_id).await?;
    let transactions = db.transactions.list_for_request(&request_id).await?;
    ok(transactions)
}
