// ABOUTME: Payout ratio negotiation storage
// ABOUTME: Every ratio rewrite resets acceptance; distribution requires all accepted

use bountyboard_core::{generate_id, IdPrefix};
use bountyboard_storage::StorageError;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{SettlementError, SettlementResult};
use crate::types::{PaymentRatio, RatioInput, RatioMessage};

/// Tolerance for the percentage sum check.
const SUM_TOLERANCE: f64 = 0.01;

pub struct RatioStorage {
    pool: SqlitePool,
}

impl RatioStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List ratios, materializing an even split when none exist yet and the
    /// request has active developers. A single developer is auto-accepted at
    /// 100.00 since there is nothing to negotiate.
    pub async fn ensure_default_ratios(
        &self,
        request_id: &str,
        developer_ids: &[String],
    ) -> SettlementResult<Vec<PaymentRatio>> {
        let existing = self.list(request_id).await?;
        if !existing.is_empty() || developer_ids.is_empty() {
            return Ok(existing);
        }

        debug!(
            "Materializing even split for request {} across {} developers",
            request_id,
            developer_ids.len()
        );

        let single = developer_ids.len() == 1;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Split 100.00% in hundredths so the parts always sum exactly.
        let n = developer_ids.len() as i64;
        let base = 10_000 / n;
        let remainder = 10_000 % n;

        for (idx, developer_id) in developer_ids.iter().enumerate() {
            let hundredths = base + if (idx as i64) < remainder { 1 } else { 0 };
            sqlx::query(
                r#"
                INSERT INTO payment_ratios
                    (id, feature_request_id, developer_id, ratio_percentage,
                     is_accepted, accepted_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(generate_id(IdPrefix::Ratio))
            .bind(request_id)
            .bind(developer_id)
            .bind(hundredths as f64 / 100.0)
            .bind(single)
            .bind(if single { Some(now) } else { None })
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.list(request_id).await
    }

    /// Replace the full ratio set in one transaction.
    ///
    /// Every row's acceptance is reset, and rows for developers absent from
    /// the payload are removed, so any change reopens the negotiation.
    pub async fn set_ratios(
        &self,
        request_id: &str,
        inputs: &[RatioInput],
    ) -> SettlementResult<Vec<PaymentRatio>> {
        if inputs.is_empty() {
            return Err(SettlementError::Validation(
                "at least one payout ratio is required".into(),
            ));
        }
        let mut sum = 0.0;
        for input in inputs {
            if !(0.0..=100.0).contains(&input.percentage) {
                return Err(SettlementError::Validation(format!(
                    "ratio for {} must be between 0 and 100",
                    input.developer_id
                )));
            }
            sum += input.percentage;
        }
        if (sum - 100.0).abs() > SUM_TOLERANCE {
            return Err(SettlementError::Validation(format!(
                "payout ratios must sum to 100, got {:.2}",
                sum
            )));
        }

        let mut tx = self.pool.begin().await?;

        let placeholders = vec!["?"; inputs.len()].join(", ");
        let delete_sql = format!(
            "DELETE FROM payment_ratios
             WHERE feature_request_id = ? AND developer_id NOT IN ({placeholders})"
        );
        let mut delete = sqlx::query(&delete_sql).bind(request_id);
        for input in inputs {
            delete = delete.bind(&input.developer_id);
        }
        delete.execute(&mut *tx).await?;

        for input in inputs {
            sqlx::query(
                r#"
                INSERT INTO payment_ratios
                    (id, feature_request_id, developer_id, ratio_percentage,
                     is_accepted, accepted_at)
                VALUES (?, ?, ?, ?, 0, NULL)
                ON CONFLICT(feature_request_id, developer_id)
                DO UPDATE SET ratio_percentage = excluded.ratio_percentage,
                              is_accepted = 0, accepted_at = NULL
                "#,
            )
            .bind(generate_id(IdPrefix::Ratio))
            .bind(request_id)
            .bind(&input.developer_id)
            .bind(input.percentage)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("Payout ratios rewritten for request {}", request_id);
        self.list(request_id).await
    }

    /// Accept the caller's own ratio row.
    pub async fn accept_ratio(
        &self,
        request_id: &str,
        developer_id: &str,
    ) -> SettlementResult<PaymentRatio> {
        let result = sqlx::query(
            "UPDATE payment_ratios SET is_accepted = 1, accepted_at = ?
             WHERE feature_request_id = ? AND developer_id = ?",
        )
        .bind(Utc::now())
        .bind(request_id)
        .bind(developer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SettlementError::NotFound("payout ratio"));
        }

        let row = sqlx::query(
            "SELECT * FROM payment_ratios WHERE feature_request_id = ? AND developer_id = ?",
        )
        .bind(request_id)
        .bind(developer_id)
        .fetch_one(&self.pool)
        .await?;
        row_to_ratio(&row)
    }

    /// True when ratios exist and every developer has accepted.
    pub async fn all_accepted(&self, request_id: &str) -> SettlementResult<bool> {
        let (total, accepted): (i64, i64) = {
            let row = sqlx::query(
                "SELECT COUNT(*) AS total, COALESCE(SUM(is_accepted), 0) AS accepted
                 FROM payment_ratios WHERE feature_request_id = ?",
            )
            .bind(request_id)
            .fetch_one(&self.pool)
            .await?;
            (
                row.try_get("total").map_err(StorageError::Sqlx)?,
                row.try_get("accepted").map_err(StorageError::Sqlx)?,
            )
        };
        Ok(total > 0 && accepted == total)
    }

    pub async fn list(&self, request_id: &str) -> SettlementResult<Vec<PaymentRatio>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_ratios WHERE feature_request_id = ?
             ORDER BY developer_id",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_ratio).collect()
    }

    pub async fn add_message(
        &self,
        request_id: &str,
        sender_id: &str,
        message: &str,
    ) -> SettlementResult<RatioMessage> {
        if message.trim().is_empty() {
            return Err(SettlementError::Validation("message cannot be empty".into()));
        }

        let id = generate_id(IdPrefix::RatioMessage);
        sqlx::query(
            "INSERT INTO payment_ratio_messages
                 (id, feature_request_id, sender_id, message, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(request_id)
        .bind(sender_id)
        .bind(message.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM payment_ratio_messages WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        row_to_message(&row)
    }

    pub async fn list_messages(&self, request_id: &str) -> SettlementResult<Vec<RatioMessage>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_ratio_messages WHERE feature_request_id = ?
             ORDER BY created_at",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_message).collect()
    }
}

fn row_to_ratio(row: &sqlx::sqlite::SqliteRow) -> SettlementResult<PaymentRatio> {
    Ok(PaymentRatio {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        developer_id: row.try_get("developer_id").map_err(StorageError::Sqlx)?,
        ratio_percentage: row
            .try_get("ratio_percentage")
            .map_err(StorageError::Sqlx)?,
        is_accepted: row.try_get("is_accepted").map_err(StorageError::Sqlx)?,
        accepted_at: row.try_get("accepted_at").map_err(StorageError::Sqlx)?,
    })
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> SettlementResult<RatioMessage> {
    Ok(RatioMessage {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        sender_id: row.try_get("sender_id").map_err(StorageError::Sqlx)?,
        message: row.try_get("message").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
    })
}
