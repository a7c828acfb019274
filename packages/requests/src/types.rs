// ABOUTME: Feature request type definitions
// ABOUTME: Structures for requests, comments/bids, developers, and history

use bountyboard_core::{Cents, Currency};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Requested,
    InProgress,
    Completed,
    Confirmed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Confirmed | RequestStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Requested => "requested",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Confirmed => "confirmed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    UiUx,
    Backend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestCategory {
    Bug,
    Enhancement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommenterType {
    Requester,
    Dev,
    System,
}

/// Who removed a developer from a request, kept in the audit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum RemovedBy {
    #[sqlx(rename = "self")]
    #[serde(rename = "self")]
    SelfRemoval,
    #[sqlx(rename = "admin")]
    #[serde(rename = "admin")]
    Admin,
    #[sqlx(rename = "system")]
    #[serde(rename = "system")]
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub id: String,
    pub title: String,
    #[serde(rename = "appId")]
    pub app_id: String,
    /// None when the creator account has been deleted.
    #[serde(rename = "creatorId")]
    pub creator_id: Option<String>,
    #[serde(rename = "requestType")]
    pub request_type: RequestType,
    #[serde(rename = "requestCategory")]
    pub request_category: RequestCategory,
    pub status: RequestStatus,
    /// Cached sum of non-deleted comment bids. Recomputed in the same
    /// transaction as every comment mutation.
    #[serde(rename = "totalBidCents")]
    pub total_bid_cents: Cents,
    #[serde(rename = "dateRequested")]
    pub date_requested: DateTime<Utc>,
    #[serde(rename = "projectedCompletionDate")]
    pub projected_completion_date: Option<DateTime<Utc>>,
    #[serde(rename = "deliveredDate")]
    pub delivered_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: String,
    #[serde(rename = "commenterId")]
    pub commenter_id: String,
    #[serde(rename = "commenterType")]
    pub commenter_type: CommenterType,
    pub body: String,
    #[serde(rename = "bidCents")]
    pub bid_cents: Cents,
    /// Currency the bid was placed in; None for zero bids and legacy rows.
    #[serde(rename = "bidCurrency")]
    pub bid_currency: Option<Currency>,
    #[serde(rename = "isEdited")]
    pub is_edited: bool,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
    #[serde(rename = "originalBody")]
    pub original_body: Option<String>,
    #[serde(rename = "postedAt")]
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDeveloper {
    pub id: String,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: String,
    #[serde(rename = "developerId")]
    pub developer_id: String,
    #[serde(rename = "isApproved")]
    pub is_approved: bool,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    #[serde(rename = "removedAt")]
    pub removed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperHistoryEntry {
    pub id: String,
    #[serde(rename = "featureRequestId")]
    pub feature_request_id: String,
    #[serde(rename = "developerId")]
    pub developer_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "removedAt")]
    pub removed_at: DateTime<Utc>,
    #[serde(rename = "removedBy")]
    pub removed_by: RemovedBy,
}

/// A bidder's aggregate non-deleted bid total on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidderAggregate {
    pub user_id: String,
    pub total_cents: Cents,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestCreateInput {
    pub title: String,
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "requestType")]
    pub request_type: RequestType,
    #[serde(rename = "requestCategory")]
    pub request_category: RequestCategory,
    /// Body of the opening comment.
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestUpdateInput {
    #[serde(rename = "requestType")]
    pub request_type: Option<RequestType>,
    #[serde(rename = "requestCategory")]
    pub request_category: Option<RequestCategory>,
    #[serde(rename = "projectedCompletionDate")]
    pub projected_completion_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub body: String,
    #[serde(rename = "bidCents", default)]
    pub bid_cents: i64,
}

/// Candidate duplicate returned by the similar-request check.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub title: String,
    pub score: f64,
}
