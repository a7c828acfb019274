// ABOUTME: Feature request storage layer using SQLite
// ABOUTME: Enforces lifecycle gates and keeps the cached bid total consistent

use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use bountyboard_accounts::{User, UserRole};
use bountyboard_core::{generate_id, Cents, IdPrefix};
use bountyboard_storage::StorageError;

use crate::error::{RequestError, RequestResult};
use crate::lifecycle;
use crate::similar::{self, RequestSummary};
use crate::types::*;

/// Days until the default projected completion date when a request enters
/// `in_progress` without an explicit date.
const DEFAULT_PROJECTION_DAYS: i64 = 30;

pub struct RequestStorage {
    pool: SqlitePool,
}

impl RequestStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a request together with its opening comment.
    pub async fn create_request(
        &self,
        creator: &User,
        input: RequestCreateInput,
    ) -> RequestResult<FeatureRequest> {
        if input.title.trim().is_empty() {
            return Err(RequestError::Validation("title cannot be empty".into()));
        }
        if input.body.trim().is_empty() {
            return Err(RequestError::Validation("comment cannot be empty".into()));
        }

        let request_id = generate_id(IdPrefix::Request);
        let now = Utc::now();

        debug!("Creating feature request: {} ({})", request_id, input.title);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO feature_requests
                (id, title, app_id, creator_id, request_type, request_category,
                 status, total_bid_cents, date_requested, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&request_id)
        .bind(input.title.trim())
        .bind(&input.app_id)
        .bind(&creator.id)
        .bind(input.request_type)
        .bind(input.request_category)
        .bind(RequestStatus::Requested)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO comments
                (id, feature_request_id, commenter_id, commenter_type, body,
                 bid_cents, bid_currency, posted_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, NULL, ?, ?)
            "#,
        )
        .bind(generate_id(IdPrefix::Comment))
        .bind(&request_id)
        .bind(&creator.id)
        .bind(CommenterType::Requester)
        .bind(input.body.trim())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_request(&request_id).await
    }

    pub async fn get_request(&self, request_id: &str) -> RequestResult<FeatureRequest> {
        let row = sqlx::query("SELECT * FROM feature_requests WHERE id = ?")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_request(&row),
            None => Err(RequestError::NotFound("feature request")),
        }
    }

    /// List requests in one status bucket, newest-funded first, with an
    /// optional app filter.
    pub async fn list_by_status(
        &self,
        status: RequestStatus,
        app_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> RequestResult<(Vec<FeatureRequest>, i64)> {
        let (count_sql, list_sql) = match app_id {
            Some(_) => (
                "SELECT COUNT(*) FROM feature_requests WHERE status = ? AND app_id = ?",
                "SELECT * FROM feature_requests WHERE status = ? AND app_id = ?
                 ORDER BY total_bid_cents DESC, date_requested DESC LIMIT ? OFFSET ?",
            ),
            None => (
                "SELECT COUNT(*) FROM feature_requests WHERE status = ?",
                "SELECT * FROM feature_requests WHERE status = ?
                 ORDER BY total_bid_cents DESC, date_requested DESC LIMIT ? OFFSET ?",
            ),
        };

        let mut count_query = sqlx::query_scalar::<_, i64>(count_sql).bind(status);
        let mut list_query = sqlx::query(list_sql).bind(status);
        if let Some(app) = app_id {
            count_query = count_query.bind(app);
            list_query = list_query.bind(app);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let requests = rows
            .iter()
            .map(row_to_request)
            .collect::<RequestResult<Vec<_>>>()?;
        Ok((requests, total))
    }

    /// Update type/category/projected date. Developer-only; checked by caller
    /// via `is_active_developer`.
    pub async fn update_request(
        &self,
        request_id: &str,
        input: RequestUpdateInput,
    ) -> RequestResult<FeatureRequest> {
        let request = self.get_request(request_id).await?;

        sqlx::query(
            r#"
            UPDATE feature_requests
            SET request_type = ?, request_category = ?,
                projected_completion_date = COALESCE(?, projected_completion_date),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.request_type.unwrap_or(request.request_type))
        .bind(input.request_category.unwrap_or(request.request_category))
        .bind(input.projected_completion_date)
        .bind(Utc::now())
        .bind(request_id)
        .execute(&self.pool)
        .await?;

        self.get_request(request_id).await
    }

    // ---- Bid ledger -------------------------------------------------------

    /// Add a comment, optionally carrying a bid, and recompute the cached
    /// total in the same transaction.
    pub async fn add_comment(
        &self,
        request_id: &str,
        author: &User,
        input: CommentInput,
    ) -> RequestResult<Comment> {
        let request = self.get_request(request_id).await?;
        validate_bid(author, &input)?;
        if request.status.is_terminal() {
            return Err(RequestError::Validation(
                "cannot comment on a closed request".into(),
            ));
        }

        let comment_id = generate_id(IdPrefix::Comment);
        let now = Utc::now();
        let commenter_type = commenter_type_for(author);
        let bid_currency = if input.bid_cents > 0 {
            Some(author.preferred_currency)
        } else {
            None
        };

        debug!(
            "Adding comment {} to request {} (bid: {})",
            comment_id,
            request_id,
            Cents(input.bid_cents)
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO comments
                (id, feature_request_id, commenter_id, commenter_type, body,
                 bid_cents, bid_currency, posted_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment_id)
        .bind(request_id)
        .bind(&author.id)
        .bind(commenter_type)
        .bind(input.body.trim())
        .bind(input.bid_cents)
        .bind(bid_currency)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        recompute_total(&mut tx, request_id).await?;
        tx.commit().await?;

        self.get_comment(comment_id.as_str()).await
    }

    /// Edit a comment. Author-only, requesters only, and only while the
    /// request is still `requested`.
    pub async fn edit_comment(
        &self,
        request_id: &str,
        comment_id: &str,
        author: &User,
        input: CommentInput,
    ) -> RequestResult<Comment> {
        let request = self.get_request(request_id).await?;
        let comment = self.get_comment(comment_id).await?;

        self.check_comment_mutable(&request, &comment, author)?;
        validate_bid(author, &input)?;

        let bid_currency = if input.bid_cents > 0 {
            Some(author.preferred_currency)
        } else {
            None
        };

        let mut tx = self.pool.begin().await?;

        // Preserve the original body the first time only.
        sqlx::query(
            r#"
            UPDATE comments
            SET original_body = CASE WHEN is_edited = 0 THEN body ELSE original_body END,
                body = ?, bid_cents = ?, bid_currency = ?, is_edited = 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.body.trim())
        .bind(input.bid_cents)
        .bind(bid_currency)
        .bind(Utc::now())
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

        recompute_total(&mut tx, request_id).await?;
        tx.commit().await?;

        self.get_comment(comment_id).await
    }

    /// Soft-delete a comment under the same gates as editing.
    pub async fn delete_comment(
        &self,
        request_id: &str,
        comment_id: &str,
        author: &User,
    ) -> RequestResult<()> {
        let request = self.get_request(request_id).await?;
        let comment = self.get_comment(comment_id).await?;

        self.check_comment_mutable(&request, &comment, author)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE comments
            SET original_body = CASE WHEN is_deleted = 0 THEN body ELSE original_body END,
                is_deleted = 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

        recompute_total(&mut tx, request_id).await?;
        tx.commit().await?;

        Ok(())
    }

    fn check_comment_mutable(
        &self,
        request: &FeatureRequest,
        comment: &Comment,
        author: &User,
    ) -> RequestResult<()> {
        if comment.commenter_id != author.id {
            return Err(RequestError::Authorization(
                "only the author may modify a comment".into(),
            ));
        }
        if author.role != UserRole::Requester {
            return Err(RequestError::Authorization(
                "only requesters may modify comments".into(),
            ));
        }
        if request.status != RequestStatus::Requested {
            return Err(RequestError::Validation(
                "comments can only be changed while the request is open".into(),
            ));
        }
        Ok(())
    }

    pub async fn get_comment(&self, comment_id: &str) -> RequestResult<Comment> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_comment(&row),
            None => Err(RequestError::NotFound("comment")),
        }
    }

    pub async fn list_comments(&self, request_id: &str) -> RequestResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT * FROM comments WHERE feature_request_id = ? AND is_deleted = 0
             ORDER BY posted_at ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_comment).collect()
    }

    /// Sum of the caller's non-deleted bids on the request.
    pub async fn user_bid_cents(&self, request_id: &str, user_id: &str) -> RequestResult<Cents> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(bid_cents), 0) FROM comments
             WHERE feature_request_id = ? AND commenter_id = ? AND is_deleted = 0",
        )
        .bind(request_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Cents(total))
    }

    /// Aggregate non-deleted, non-zero bids per bidder.
    pub async fn bidder_aggregates(&self, request_id: &str) -> RequestResult<Vec<BidderAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT commenter_id, SUM(bid_cents) AS total
            FROM comments
            WHERE feature_request_id = ? AND is_deleted = 0 AND bid_cents > 0
            GROUP BY commenter_id
            ORDER BY total DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(BidderAggregate {
                    user_id: row.try_get("commenter_id").map_err(StorageError::Sqlx)?,
                    total_cents: Cents(row.try_get("total").map_err(StorageError::Sqlx)?),
                })
            })
            .collect()
    }

    // ---- Developer membership ---------------------------------------------

    /// Join a request as a developer. The first active developer is
    /// auto-approved and moves the request to `in_progress`.
    pub async fn add_developer(&self, request_id: &str, dev: &User) -> RequestResult<RequestDeveloper> {
        if dev.role != UserRole::Dev {
            return Err(RequestError::Authorization(
                "only developers can join requests".into(),
            ));
        }

        let request = self.get_request(request_id).await?;

        if self.is_active_developer(request_id, &dev.id).await? {
            return Err(RequestError::Validation(
                "already a developer on this request".into(),
            ));
        }

        let active = self.list_developers(request_id, true).await?;
        let is_approved = active.is_empty();
        let link_id = generate_id(IdPrefix::Developer);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO request_developers
                (id, feature_request_id, developer_id, is_approved, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&link_id)
        .bind(request_id)
        .bind(&dev.id)
        .bind(is_approved)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if request.status == RequestStatus::Requested {
            lifecycle::validate_transition(request.status, RequestStatus::InProgress)?;
            let projected = request
                .projected_completion_date
                .unwrap_or(now + Duration::days(DEFAULT_PROJECTION_DAYS));
            sqlx::query(
                "UPDATE feature_requests
                 SET status = ?, projected_completion_date = ?, updated_at = ?
                 WHERE id = ?",
            )
            .bind(RequestStatus::InProgress)
            .bind(projected)
            .bind(now)
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Developer {} joined request {}", dev.id, request_id);
        self.get_developer_link(&link_id).await
    }

    /// Remove an active developer, writing the audit history row. When the
    /// last active developer leaves, the request reverts to `requested` and
    /// the projected date is cleared.
    pub async fn remove_developer(
        &self,
        request_id: &str,
        developer_id: &str,
        removed_by: RemovedBy,
    ) -> RequestResult<()> {
        let link = self
            .active_link(request_id, developer_id)
            .await?
            .ok_or(RequestError::Authorization(
                "not a developer on this request".to_string(),
            ))?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO request_developer_history
                (id, feature_request_id, developer_id, started_at, removed_at, removed_by)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generate_id(IdPrefix::History))
        .bind(request_id)
        .bind(developer_id)
        .bind(link.added_at)
        .bind(now)
        .bind(removed_by)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE request_developers SET removed_at = ? WHERE id = ?")
            .bind(now)
            .bind(&link.id)
            .execute(&mut *tx)
            .await?;

        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM request_developers
             WHERE feature_request_id = ? AND removed_at IS NULL",
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        if remaining == 0 {
            sqlx::query(
                "UPDATE feature_requests
                 SET status = ?, projected_completion_date = NULL, updated_at = ?
                 WHERE id = ? AND status = ?",
            )
            .bind(RequestStatus::Requested)
            .bind(now)
            .bind(request_id)
            .bind(RequestStatus::InProgress)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Developer {} removed from request {} ({:?})",
            developer_id, request_id, removed_by
        );
        Ok(())
    }

    pub async fn is_active_developer(&self, request_id: &str, user_id: &str) -> RequestResult<bool> {
        Ok(self.active_link(request_id, user_id).await?.is_some())
    }

    async fn active_link(
        &self,
        request_id: &str,
        developer_id: &str,
    ) -> RequestResult<Option<RequestDeveloper>> {
        let row = sqlx::query(
            "SELECT * FROM request_developers
             WHERE feature_request_id = ? AND developer_id = ? AND removed_at IS NULL",
        )
        .bind(request_id)
        .bind(developer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_developer(&r)).transpose()
    }

    async fn get_developer_link(&self, link_id: &str) -> RequestResult<RequestDeveloper> {
        let row = sqlx::query("SELECT * FROM request_developers WHERE id = ?")
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_developer(&row),
            None => Err(RequestError::NotFound("developer link")),
        }
    }

    pub async fn list_developers(
        &self,
        request_id: &str,
        active_only: bool,
    ) -> RequestResult<Vec<RequestDeveloper>> {
        let sql = if active_only {
            "SELECT * FROM request_developers
             WHERE feature_request_id = ? AND removed_at IS NULL ORDER BY added_at"
        } else {
            "SELECT * FROM request_developers WHERE feature_request_id = ? ORDER BY added_at"
        };

        let rows = sqlx::query(sql).bind(request_id).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_developer).collect()
    }

    pub async fn developer_history(
        &self,
        request_id: &str,
    ) -> RequestResult<Vec<DeveloperHistoryEntry>> {
        let rows = sqlx::query(
            "SELECT * FROM request_developer_history
             WHERE feature_request_id = ? ORDER BY removed_at",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_history).collect()
    }

    // ---- Status ------------------------------------------------------------

    /// Direct status change by a developer or admin. `confirmed` is not
    /// reachable this way.
    pub async fn set_status(
        &self,
        request_id: &str,
        new_status: RequestStatus,
        projected_completion_date: Option<DateTime<Utc>>,
    ) -> RequestResult<FeatureRequest> {
        if !lifecycle::is_settable_by_developer(new_status) {
            return Err(RequestError::Validation(
                "confirmed status is set by requester confirmation".into(),
            ));
        }

        let request = self.get_request(request_id).await?;
        lifecycle::validate_transition(request.status, new_status)?;

        let now = Utc::now();
        let projected = match new_status {
            RequestStatus::Completed => None,
            RequestStatus::InProgress => projected_completion_date
                .or(request.projected_completion_date)
                .or(Some(now + Duration::days(DEFAULT_PROJECTION_DAYS))),
            _ => projected_completion_date.or(request.projected_completion_date),
        };
        let delivered = match new_status {
            RequestStatus::Completed => Some(now),
            _ => request.delivered_date,
        };

        sqlx::query(
            "UPDATE feature_requests
             SET status = ?, projected_completion_date = ?, delivered_date = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(new_status)
        .bind(projected)
        .bind(delivered)
        .bind(now)
        .bind(request_id)
        .execute(&self.pool)
        .await?;

        info!(
            "Request {} status: {:?} -> {:?}",
            request_id, request.status, new_status
        );
        self.get_request(request_id).await
    }

    /// Compare-and-swap transition to `confirmed`. Returns false when another
    /// caller already won the race, which must skip settlement.
    pub async fn try_mark_confirmed(&self, request_id: &str) -> RequestResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE feature_requests
             SET status = ?, delivered_date = COALESCE(delivered_date, ?), updated_at = ?
             WHERE id = ? AND status = ?",
        )
        .bind(RequestStatus::Confirmed)
        .bind(now)
        .bind(now)
        .bind(request_id)
        .bind(RequestStatus::Completed)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    // ---- Confirmations -----------------------------------------------------

    /// Record a bidder's confirmation. Idempotent per user.
    pub async fn record_confirmation(&self, request_id: &str, user_id: &str) -> RequestResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO request_confirmations
                 (id, feature_request_id, user_id, confirmed_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(generate_id(IdPrefix::Confirmation))
        .bind(request_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn confirmation_count(&self, request_id: &str) -> RequestResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM request_confirmations WHERE feature_request_id = ?",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Number of distinct users with a non-deleted, non-zero bid.
    pub async fn distinct_bidders(&self, request_id: &str) -> RequestResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT commenter_id) FROM comments
             WHERE feature_request_id = ? AND is_deleted = 0 AND bid_cents > 0",
        )
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // ---- Similarity --------------------------------------------------------

    /// Open requests for the app with their opening comment, as candidates
    /// for the duplicate check.
    pub async fn similar_candidates(
        &self,
        app_id: &str,
        title: &str,
        body: &str,
        threshold: f64,
        max_results: usize,
    ) -> RequestResult<Vec<SimilarRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT fr.id AS id, fr.title AS title,
                   COALESCE((SELECT body FROM comments c
                             WHERE c.feature_request_id = fr.id
                             ORDER BY c.posted_at ASC LIMIT 1), '') AS body
            FROM feature_requests fr
            WHERE fr.app_id = ? AND fr.status IN ('requested', 'in_progress')
            "#,
        )
        .bind(app_id)
        .fetch_all(&self.pool)
        .await?;

        let candidates = rows
            .iter()
            .map(|row| {
                Ok(RequestSummary {
                    request_id: row.try_get("id").map_err(StorageError::Sqlx)?,
                    title: row.try_get("title").map_err(StorageError::Sqlx)?,
                    body: row.try_get("body").map_err(StorageError::Sqlx)?,
                })
            })
            .collect::<RequestResult<Vec<_>>>()?;

        Ok(similar::find_similar(
            &candidates,
            title,
            body,
            threshold,
            max_results,
        ))
    }
}

fn commenter_type_for(user: &User) -> CommenterType {
    match user.role {
        UserRole::Requester => CommenterType::Requester,
        UserRole::Dev | UserRole::Admin => CommenterType::Dev,
    }
}

fn validate_bid(author: &User, input: &CommentInput) -> RequestResult<()> {
    if input.body.trim().is_empty() {
        return Err(RequestError::Validation("comment cannot be empty".into()));
    }
    if input.bid_cents < 0 {
        return Err(RequestError::Validation(
            "bid amount cannot be negative".into(),
        ));
    }
    if input.bid_cents > 0 && !author.can_receive_payments() {
        return Err(RequestError::Validation(
            "a connected payment account is required to place bids".into(),
        ));
    }
    Ok(())
}

/// Rewrite the cached total from the non-deleted comment bids. Always runs
/// inside the transaction of the mutation that made it stale.
async fn recompute_total(
    tx: &mut Transaction<'_, Sqlite>,
    request_id: &str,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        UPDATE feature_requests
        SET total_bid_cents = (
            SELECT COALESCE(SUM(bid_cents), 0) FROM comments
            WHERE feature_request_id = ? AND is_deleted = 0
        ),
        updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(request_id)
    .bind(Utc::now())
    .bind(request_id)
    .execute(&mut **tx)
    .await
    .map_err(StorageError::Sqlx)?;
    Ok(())
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> RequestResult<FeatureRequest> {
    Ok(FeatureRequest {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        title: row.try_get("title").map_err(StorageError::Sqlx)?,
        app_id: row.try_get("app_id").map_err(StorageError::Sqlx)?,
        creator_id: row.try_get("creator_id").map_err(StorageError::Sqlx)?,
        request_type: row.try_get("request_type").map_err(StorageError::Sqlx)?,
        request_category: row
            .try_get("request_category")
            .map_err(StorageError::Sqlx)?,
        status: row.try_get("status").map_err(StorageError::Sqlx)?,
        total_bid_cents: Cents(row.try_get("total_bid_cents").map_err(StorageError::Sqlx)?),
        date_requested: row.try_get("date_requested").map_err(StorageError::Sqlx)?,
        projected_completion_date: row
            .try_get("projected_completion_date")
            .map_err(StorageError::Sqlx)?,
        delivered_date: row.try_get("delivered_date").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> RequestResult<Comment> {
    Ok(Comment {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        commenter_id: row.try_get("commenter_id").map_err(StorageError::Sqlx)?,
        commenter_type: row.try_get("commenter_type").map_err(StorageError::Sqlx)?,
        body: row.try_get("body").map_err(StorageError::Sqlx)?,
        bid_cents: Cents(row.try_get("bid_cents").map_err(StorageError::Sqlx)?),
        bid_currency: row.try_get("bid_currency").map_err(StorageError::Sqlx)?,
        is_edited: row.try_get("is_edited").map_err(StorageError::Sqlx)?,
        is_deleted: row.try_get("is_deleted").map_err(StorageError::Sqlx)?,
        original_body: row.try_get("original_body").map_err(StorageError::Sqlx)?,
        posted_at: row.try_get("posted_at").map_err(StorageError::Sqlx)?,
        updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
    })
}

fn row_to_developer(row: &sqlx::sqlite::SqliteRow) -> RequestResult<RequestDeveloper> {
    Ok(RequestDeveloper {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        developer_id: row.try_get("developer_id").map_err(StorageError::Sqlx)?,
        is_approved: row.try_get("is_approved").map_err(StorageError::Sqlx)?,
        added_at: row.try_get("added_at").map_err(StorageError::Sqlx)?,
        removed_at: row.try_get("removed_at").map_err(StorageError::Sqlx)?,
    })
}

fn row_to_history(row: &sqlx::sqlite::SqliteRow) -> RequestResult<DeveloperHistoryEntry> {
    Ok(DeveloperHistoryEntry {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        developer_id: row.try_get("developer_id").map_err(StorageError::Sqlx)?,
        started_at: row.try_get("started_at").map_err(StorageError::Sqlx)?,
        removed_at: row.try_get("removed_at").map_err(StorageError::Sqlx)?,
        removed_by: row.try_get("removed_by").map_err(StorageError::Sqlx)?,
    })
}
