// ABOUTME: Account type definitions
// ABOUTME: Users carry role, preferred currency, and payment-account linkage

use bountyboard_core::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Requester,
    Dev,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "preferredCurrency")]
    pub preferred_currency: Currency,
    /// Connected payment-processor account; None means the user cannot bid
    /// or receive payouts.
    #[serde(rename = "stripeAccountId")]
    pub stripe_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn can_receive_payments(&self) -> bool {
        self.stripe_account_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateInput {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "preferredCurrency")]
    pub preferred_currency: Option<Currency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppCreateInput {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub description: Option<String>,
}
