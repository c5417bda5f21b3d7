use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    ChannelKind, Customer, NotificationKind, NotificationRecord, RepairStatus, RepairTicket, Store,
};
use crate::services::notification::ChannelOutcome;
use crate::services::repair::{ContactQuery, RepairStore};

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates a new database connection pool with the provided configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    log::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // Set timezone to UTC for all connections
                sqlx::query("SET timezone = 'UTC'").execute(conn).await?;
                Ok(())
            })
        })
        .connect(&config.url)
        .await?;

    log::info!(
        "Database connection pool established (max: {}, min: {})",
        config.max_connections,
        config.min_connections
    );

    Ok(pool)
}

/// Runs all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("Running database migrations...");

    sqlx::migrate!("./migrations").run(pool).await?;

    log::info!("Database migrations completed successfully");
    Ok(())
}

/// Performs a health check on the database connection
pub async fn health_check(pool: &DbPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

// =============================================================================
// PostgreSQL Repair Store
// =============================================================================

/// PostgreSQL implementation of the repair record store
pub struct PgRepairStore {
    pool: DbPool,
}

impl PgRepairStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RepairStore for PgRepairStore {
    async fn get_by_id(&self, id: Uuid) -> AppResult<RepairTicket> {
        sqlx::query_as::<_, RepairTicket>("SELECT * FROM repairs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Repair {} not found", id)))
    }

    async fn find_by_ticket_number(
        &self,
        ticket_number: &str,
    ) -> AppResult<Option<RepairTicket>> {
        let repair = sqlx::query_as::<_, RepairTicket>(
            "SELECT * FROM repairs WHERE UPPER(ticket_number) = UPPER($1)",
        )
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(repair)
    }

    async fn find_by_contact(&self, query: &ContactQuery) -> AppResult<Vec<RepairTicket>> {
        let repairs = match query {
            ContactQuery::Phone(digits) => {
                sqlx::query_as::<_, RepairTicket>(
                    r#"
                    SELECT r.* FROM repairs r
                    JOIN customers c ON c.id = r.customer_id
                    WHERE regexp_replace(COALESCE(r.whatsapp_number, ''), '\D', '', 'g') = $1
                       OR regexp_replace(COALESCE(c.phone, ''), '\D', '', 'g') = $1
                    ORDER BY r.received_at DESC
                    "#,
                )
                .bind(digits)
                .fetch_all(&self.pool)
                .await?
            }
            ContactQuery::Email(email) => {
                sqlx::query_as::<_, RepairTicket>(
                    r#"
                    SELECT r.* FROM repairs r
                    JOIN customers c ON c.id = r.customer_id
                    WHERE LOWER(r.notification_email) = $1
                       OR LOWER(c.email) = $1
                    ORDER BY r.received_at DESC
                    "#,
                )
                .bind(email)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(repairs)
    }

    async fn update_status(&self, id: Uuid, status: RepairStatus) -> AppResult<RepairTicket> {
        sqlx::query_as::<_, RepairTicket>(
            r#"
            UPDATE repairs
            SET status = $2,
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Repair {} not found", id)))
    }

    async fn append_notification_record(
        &self,
        id: Uuid,
        channel: ChannelKind,
        kind: &NotificationKind,
        outcome: &ChannelOutcome,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO repair_notifications
                (repair_id, channel, kind, success, provider_message_id, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(channel)
        .bind(kind.as_str())
        .bind(outcome.success)
        .bind(&outcome.provider_id)
        .bind(&outcome.error)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound(format!("Repair {} not found", id));
                }
            }
            AppError::Database(e)
        })?;

        // The notified flags are monotonic: a later failed attempt does not
        // unset an earlier success, and the timestamp tracks successes only.
        let column = match channel {
            ChannelKind::Whatsapp => "whatsapp_notified",
            ChannelKind::Email => "email_notified",
        };

        sqlx::query(&format!(
            r#"
            UPDATE repairs
            SET {column} = {column} OR $2,
                last_notified_at = CASE WHEN $2 THEN $3 ELSE last_notified_at END,
                updated_at = NOW()
            WHERE id = $1
            "#
        ))
        .bind(id)
        .bind(outcome.success)
        .bind(at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn notification_history(
        &self,
        repair_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<NotificationRecord>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            r#"
            SELECT id, repair_id, channel, kind, success,
                   provider_message_id, error_message, created_at
            FROM repair_notifications
            WHERE repair_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(repair_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn customer_by_id(&self, id: Uuid) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    async fn store_by_id(&self, id: Uuid) -> AppResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(store)
    }
}
