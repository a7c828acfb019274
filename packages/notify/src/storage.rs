// ABOUTME: Persisted notification feed
// ABOUTME: Payload column holds the serialized NotificationKind

use bountyboard_storage::StorageError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use bountyboard_core::{generate_id, IdPrefix};

use crate::kind::NotificationKind;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub message: String,
    pub link: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NotificationStorage {
    pool: SqlitePool,
}

impl NotificationStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn notify(
        &self,
        user_id: &str,
        kind: &NotificationKind,
    ) -> Result<Notification, StorageError> {
        let id = generate_id(IdPrefix::Notification);
        let payload = serde_json::to_string(kind).map_err(StorageError::Json)?;

        debug!("Notifying {}: {}", user_id, kind.code());

        sqlx::query(
            "INSERT INTO notifications (id, user_id, kind, payload, is_read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(kind.code())
        .bind(&payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get(&id).await
    }

    pub async fn get(&self, notification_id: &str) -> Result<Notification, StorageError> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(notification_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => row_to_notification(&row),
            None => Err(StorageError::NotFound),
        }
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, StorageError> {
        let sql = if unread_only {
            "SELECT * FROM notifications WHERE user_id = ? AND is_read = 0
             ORDER BY created_at DESC"
        } else {
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC"
        };

        let rows = sqlx::query(sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_notification).collect()
    }

    /// Mark one of the user's notifications read. Scoped to the owner so one
    /// user cannot touch another's feed.
    pub async fn mark_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected())
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification, StorageError> {
    let payload: String = row.try_get("payload").map_err(StorageError::Sqlx)?;
    let kind: NotificationKind = serde_json::from_str(&payload).map_err(StorageError::Json)?;

    Ok(Notification {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        user_id: row.try_get("user_id").map_err(StorageError::Sqlx)?,
        message: kind.render(),
        link: kind.link(),
        kind,
        is_read: row.try_get("is_read").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
    })
}
