// ABOUTME: Immutable payment transaction ledger
// ABOUTME: Rows are inserted once and never updated or deleted

use bountyboard_core::{generate_id, Cents, Currency, IdPrefix};
use bountyboard_storage::StorageError;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::SettlementResult;
use crate::types::{Direction, PaymentTransaction, TransactionType};

pub struct TransactionStorage {
    pool: SqlitePool,
}

/// Fields for a new ledger row.
pub struct TransactionRecord<'a> {
    pub user_id: Option<&'a str>,
    pub guest_email: Option<&'a str>,
    pub transaction_type: TransactionType,
    pub amount_cents: Cents,
    pub currency: Currency,
    pub app_id: Option<&'a str>,
    pub feature_request_id: Option<&'a str>,
    pub processor_transaction_id: Option<&'a str>,
    pub direction: Direction,
}

impl TransactionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, record: TransactionRecord<'_>) -> SettlementResult<PaymentTransaction> {
        let id = generate_id(IdPrefix::Transaction);
        let now = Utc::now();
        let is_guest = record.user_id.is_none();

        debug!(
            "Recording {:?} transaction {} ({} {})",
            record.direction, id, record.amount_cents, record.currency
        );

        sqlx::query(
            r#"
            INSERT INTO payment_transactions
                (id, user_id, guest_email, transaction_type, amount_cents, currency,
                 app_id, feature_request_id, processor_transaction_id, direction,
                 is_guest, transaction_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(record.user_id)
        .bind(record.guest_email)
        .bind(record.transaction_type)
        .bind(record.amount_cents.value())
        .bind(record.currency)
        .bind(record.app_id)
        .bind(record.feature_request_id)
        .bind(record.processor_transaction_id)
        .bind(record.direction)
        .bind(is_guest)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// Record a tip toward an app, from a known user or a guest email.
    pub async fn record_tip(
        &self,
        app_id: &str,
        user_id: Option<&str>,
        guest_email: Option<&str>,
        amount: Cents,
        currency: Currency,
        processor_transaction_id: Option<&str>,
    ) -> SettlementResult<PaymentTransaction> {
        self.record(TransactionRecord {
            user_id,
            guest_email,
            transaction_type: TransactionType::Tip,
            amount_cents: amount,
            currency,
            app_id: Some(app_id),
            feature_request_id: None,
            processor_transaction_id,
            direction: Direction::Tip,
        })
        .await
    }

    pub async fn get(&self, transaction_id: &str) -> SettlementResult<PaymentTransaction> {
        let row = sqlx::query("SELECT * FROM payment_transactions WHERE id = ?")
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_transaction(&row),
            None => Err(crate::error::SettlementError::NotFound("transaction")),
        }
    }

    pub async fn list_for_user(&self, user_id: &str) -> SettlementResult<Vec<PaymentTransaction>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_transactions WHERE user_id = ?
             ORDER BY transaction_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }

    pub async fn list_for_request(
        &self,
        request_id: &str,
    ) -> SettlementResult<Vec<PaymentTransaction>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_transactions WHERE feature_request_id = ?
             ORDER BY transaction_date",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_transaction).collect()
    }
}

fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> SettlementResult<PaymentTransaction> {
    Ok(PaymentTransaction {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        user_id: row.try_get("user_id").map_err(StorageError::Sqlx)?,
        guest_email: row.try_get("guest_email").map_err(StorageError::Sqlx)?,
        transaction_type: row
            .try_get("transaction_type")
            .map_err(StorageError::Sqlx)?,
        amount_cents: Cents(row.try_get("amount_cents").map_err(StorageError::Sqlx)?),
        currency: row.try_get("currency").map_err(StorageError::Sqlx)?,
        app_id: row.try_get("app_id").map_err(StorageError::Sqlx)?,
        feature_request_id: row
            .try_get("feature_request_id")
            .map_err(StorageError::Sqlx)?,
        processor_transaction_id: row
            .try_get("processor_transaction_id")
            .map_err(StorageError::Sqlx)?,
        direction: row.try_get("direction").map_err(StorageError::Sqlx)?,
        is_guest: row.try_get("is_guest").map_err(StorageError::Sqlx)?,
        transaction_date: row
            .try_get("transaction_date")
            .map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
    })
}
