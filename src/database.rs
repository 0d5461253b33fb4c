#[cfg(feature = "database")]
use async_trait::async_trait;
#[cfg(feature = "database")]
use chrono::{DateTime, Duration, Utc};
#[cfg(feature = "database")]
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Row, SqlitePool};
#[cfg(feature = "database")]
use tracing::info;

#[cfg(feature = "database")]
use crate::config::DatabaseConfig;
#[cfg(feature = "database")]
use crate::services::memory::{clashes_with, conflict_window};
#[cfg(feature = "database")]
use crate::services::{CommitRequest, ConflictChecker, EntityStore, StoreError};
#[cfg(feature = "database")]
use crate::workflows::entity::{Booking, Entity};
#[cfg(feature = "database")]
use crate::workflows::status::{describe, EntityKind};

#[cfg(feature = "database")]
/// SQLite-backed entity store; status commits are conditional updates inside a transaction
pub struct SqliteStore {
    pool: SqlitePool,
    conflict_window: Duration,
}

#[cfg(feature = "database")]
impl SqliteStore {
    /// Initialize database with automatic migrations
    pub async fn connect(config: &DatabaseConfig, conflict_window_minutes: i64) -> anyhow::Result<Self> {
        // Create database if it doesn't exist
        if !sqlx::Sqlite::database_exists(&config.url).await? {
            info!("Creating database at {}", config.url);
            sqlx::Sqlite::create_database(&config.url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        if config.auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self {
            pool,
            conflict_window: conflict_window(conflict_window_minutes),
        })
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl EntityStore for SqliteStore {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<Entity>, StoreError> {
        let row = sqlx::query("SELECT payload FROM entities WHERE kind = ?1 AND id = ?2")
            .bind(kind.tag())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let payload: String = row.get("payload");
                Ok(Some(serde_json::from_str(&payload)?))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, entity: Entity) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&entity)?;
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO entities (kind, id, status, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            "#,
        )
        .bind(entity.kind().tag())
        .bind(entity.id())
        .bind(entity.status().map(|s| s.label()))
        .bind(payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                kind: entity.kind(),
                id: entity.id().to_string(),
            });
        }
        Ok(())
    }

    async fn commit_status(&self, request: CommitRequest) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT status, payload FROM entities WHERE kind = ?1 AND id = ?2")
            .bind(request.kind.tag())
            .bind(&request.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: request.kind,
                id: request.id.clone(),
            })?;

        let stored_label: Option<String> = row.get("status");
        let payload: String = row.get("payload");
        let mut entity: Entity = serde_json::from_str(&payload)?;

        if let Some(expected) = request.expected {
            if entity.status() != expected {
                return Err(StoreError::StatusConflict {
                    kind: request.kind,
                    id: request.id,
                    expected: describe(expected).to_string(),
                    found: describe(entity.status()).to_string(),
                });
            }
        }

        if !entity.set_status(request.new_status) {
            return Err(StoreError::Backend(format!(
                "status {} does not belong to {}",
                request.new_status, request.kind
            )));
        }

        // Conditional on the label read above so a concurrent writer loses cleanly
        let updated = sqlx::query(
            r#"
            UPDATE entities
            SET status = ?1, payload = ?2, updated_at = datetime('now')
            WHERE kind = ?3 AND id = ?4 AND status IS ?5
            "#,
        )
        .bind(request.new_status.label())
        .bind(serde_json::to_string(&entity)?)
        .bind(request.kind.tag())
        .bind(&request.id)
        .bind(stored_label.as_deref())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::StatusConflict {
                kind: request.kind,
                id: request.id,
                expected: stored_label.unwrap_or_else(|| "none".to_string()),
                found: "a concurrent update".to_string(),
            });
        }

        let record = &request.record;
        sqlx::query(
            r#"
            INSERT INTO transition_history
                (entity_kind, entity_id, transition, from_status, to_status, note, correlation_id, committed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(record.entity_kind.tag())
        .bind(&record.entity_id)
        .bind(&record.transition)
        .bind(record.from.map(|s| s.label()))
        .bind(record.to.label())
        .bind(record.note.as_deref())
        .bind(&record.correlation_id)
        .bind(record.committed_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(feature = "database")]
#[async_trait]
impl ConflictChecker for SqliteStore {
    async fn find_conflicts(
        &self,
        photographer_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM entities
            WHERE kind = 'booking' AND json_extract(payload, '$.photographer_id') = ?1
            "#,
        )
        .bind(photographer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut conflicts = Vec::new();
        for row in rows {
            let payload: String = row.get("payload");
            if let Entity::Booking(booking) = serde_json::from_str(&payload)? {
                if clashes_with(&booking, photographer_id, at, self.conflict_window) {
                    conflicts.push(booking);
                }
            }
        }
        Ok(conflicts)
    }
}
