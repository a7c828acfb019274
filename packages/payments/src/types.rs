// ABOUTME: Settlement type definitions
// ABOUTME: Transactions, payout ratios, and confirmation outcomes

use bountyboard_core::{Cents, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    FeatureRequest,
    Tip,
}

/// Which way the money moved relative to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Collected from a bidder.
    Charged,
    /// Paid out to a developer.
    Paid,
    /// Voluntary tip toward an app.
    Tip,
}

/// One immutable ledger row. Transactions are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: String,
    /// None for guest tips.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "guestEmail")]
    pub guest_email: Option<String>,
    #[serde(rename = "transactionType")]
    pub transaction_type: TransactionType,
    #[serde(rename = "amountCents")]
    pub amount_cents: Cents,
    pub currency: Currency,
    #[serde(rename = "appId")]
    pub app_id: Option<String>,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: Option<String>,
    #[serde(rename = "processorTransactionId")]
    pub processor_transaction_id: Option<String>,
    pub direction: Direction,
    #[serde(rename = "isGuest")]
    pub is_guest: bool,
    #[serde(rename = "transactionDate")]
    pub transaction_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRatio {
    pub id: String,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: String,
    #[serde(rename = "developerId")]
    pub developer_id: String,
    /// Percentage of the payout pool, two decimal places of precision.
    #[serde(rename = "ratioPercentage")]
    pub ratio_percentage: f64,
    #[serde(rename = "isAccepted")]
    pub is_accepted: bool,
    #[serde(rename = "acceptedAt")]
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioMessage {
    pub id: String,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: String,
    #[serde(rename = "senderId")]
    pub sender_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// One developer's proposed share in a `set_ratios` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RatioInput {
    #[serde(rename = "developerId")]
    pub developer_id: String,
    pub percentage: f64,
}

/// A non-fatal problem encountered during settlement, surfaced to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementWarning {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub message: String,
}

impl SettlementWarning {
    pub fn for_user(user_id: &str, message: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            user_id: None,
            message: message.into(),
        }
    }
}

/// Result of running a collection or distribution phase.
#[derive(Debug, Default)]
pub struct PhaseReport {
    pub succeeded: usize,
    pub failed: usize,
    pub warnings: Vec<SettlementWarning>,
}

impl PhaseReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Final settlement result after the confirmation quorum is reached.
#[derive(Debug, Serialize)]
pub struct SettlementOutcome {
    pub collected: bool,
    pub distributed: bool,
    pub warnings: Vec<SettlementWarning>,
}

/// What a confirmation call achieved.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// Confirmation recorded but the quorum is not yet reached, or another
    /// caller already won the settlement race.
    Pending {
        confirmations: i64,
        required: i64,
    },
    Settled(SettlementOutcome),
}
