use crate::models::IdempotencyRecord;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};

pub struct IdempotencyRepository;

impl IdempotencyRepository {
    pub async fn get(pool: &PgPool, key: &str) -> sqlx::Result<Option<IdempotencyRecord>> {
        sqlx::query_as::<_, IdempotencyRecord>(
            "SELECT key, response_data, created_at, expires_at FROM idempotency_keys WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Inserts a new record with `expires_at = now + ttl_days`. Duplicate-key
    /// insertion fails — callers must already own the key (verified via
    /// `get` returning `None`).
    pub async fn save(
        tx: &mut Transaction<'_, Postgres>,
        key: &str,
        response_data: &serde_json::Value,
        ttl_days: i64,
    ) -> sqlx::Result<()> {
        let expires_at = Utc::now() + Duration::days(ttl_days);

        sqlx::query(
            r#"
            INSERT INTO idempotency_keys (key, response_data, created_at, expires_at)
            VALUES ($1, $2, NOW(), $3)
            "#,
        )
        .bind(key)
        .bind(response_data)
        .bind(expires_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Deletes rows where `expires_at <= now`; returns the count removed.
    pub async fn sweep_expired(pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM idempotency_keys WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
