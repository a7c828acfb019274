// ABOUTME: Account storage layer using SQLite
// ABOUTME: Handles CRUD operations for users and registered apps

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use bountyboard_core::{generate_id, Currency, IdPrefix};
use bountyboard_storage::StorageError;

use super::types::{App, AppCreateInput, User, UserCreateInput};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create_user(&self, input: UserCreateInput) -> Result<User, StorageError> {
        let user_id = generate_id(IdPrefix::User);
        let now = Utc::now();

        debug!("Creating user: {} ({})", user_id, input.email);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, preferred_currency, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.role)
        .bind(input.preferred_currency.unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_user(&user_id).await
    }

    /// Get a single user by ID
    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => self.row_to_user(&row),
            None => Err(StorageError::NotFound),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(|row| self.row_to_user(row)).collect()
    }

    /// Fetch several users at once, keyed lookups done by the settlement layer.
    pub async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, StorageError> {
        let mut users = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            match self.get_user(id).await {
                Ok(user) => users.push(user),
                Err(StorageError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    /// Record (or clear) the user's connected payment-processor account.
    pub async fn set_stripe_account(
        &self,
        user_id: &str,
        stripe_account_id: Option<&str>,
    ) -> Result<User, StorageError> {
        debug!("Updating stripe account for user: {}", user_id);

        sqlx::query("UPDATE users SET stripe_account_id = ?, updated_at = ? WHERE id = ?")
            .bind(stripe_account_id)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get_user(user_id).await
    }

    pub async fn set_preferred_currency(
        &self,
        user_id: &str,
        currency: Currency,
    ) -> Result<User, StorageError> {
        sqlx::query("UPDATE users SET preferred_currency = ?, updated_at = ? WHERE id = ?")
            .bind(currency)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get_user(user_id).await
    }

    fn row_to_user(&self, row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
        Ok(User {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            name: row.try_get("name").map_err(StorageError::Sqlx)?,
            email: row.try_get("email").map_err(StorageError::Sqlx)?,
            role: row.try_get("role").map_err(StorageError::Sqlx)?,
            preferred_currency: row
                .try_get("preferred_currency")
                .map_err(StorageError::Sqlx)?,
            stripe_account_id: row
                .try_get("stripe_account_id")
                .map_err(StorageError::Sqlx)?,
            created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
            updated_at: row.try_get("updated_at").map_err(StorageError::Sqlx)?,
        })
    }
}

pub struct AppStorage {
    pool: SqlitePool,
}

impl AppStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_app(&self, input: AppCreateInput) -> Result<App, StorageError> {
        let app_id = generate_id(IdPrefix::App);

        debug!("Creating app: {} (name: {})", app_id, input.name);

        sqlx::query(
            r#"
            INSERT INTO apps (id, name, display_name, description, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&app_id)
        .bind(&input.name)
        .bind(&input.display_name)
        .bind(&input.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_app(&app_id).await
    }

    pub async fn get_app(&self, app_id: &str) -> Result<App, StorageError> {
        let row = sqlx::query("SELECT * FROM apps WHERE id = ?")
            .bind(app_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => self.row_to_app(&row),
            None => Err(StorageError::NotFound),
        }
    }

    pub async fn get_app_by_name(&self, name: &str) -> Result<Option<App>, StorageError> {
        let row = sqlx::query("SELECT * FROM apps WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(r) => Ok(Some(self.row_to_app(&r)?)),
            None => Ok(None),
        }
    }

    pub async fn list_apps(&self) -> Result<Vec<App>, StorageError> {
        let rows = sqlx::query("SELECT * FROM apps ORDER BY display_name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(|row| self.row_to_app(row)).collect()
    }

    fn row_to_app(&self, row: &sqlx::sqlite::SqliteRow) -> Result<App, StorageError> {
        Ok(App {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            name: row.try_get("name").map_err(StorageError::Sqlx)?,
            display_name: row.try_get("display_name").map_err(StorageError::Sqlx)?,
            description: row.try_get("description").map_err(StorageError::Sqlx)?,
            created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        })
    }
}
