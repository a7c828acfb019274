// ABOUTME: Authentication context for API requests
// ABOUTME: Resolves the x-user-id header to a full user record

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};

use bountyboard_accounts::User;
use bountyboard_storage::StorageError;

use crate::state::DbState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Current authenticated user, loaded from storage so handlers see role,
/// currency, and payment-account state without a second lookup.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    DbState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "Missing x-user-id header"))?;

        let db = DbState::from_ref(state);
        match db.users.get_user(user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(StorageError::NotFound) => Err((StatusCode::UNAUTHORIZED, "Unknown user")),
            Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "Database error")),
        }
    }
}
