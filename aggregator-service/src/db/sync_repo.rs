use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// Singleton watermark row (`id = 1`) with cooperative mutual-exclusion
/// semantics, guarding overlapping sync runs.
pub struct SyncMetadataRepository;

impl SyncMetadataRepository {
    /// Opens a short write transaction, selects the row with a row-level
    /// write lock, and either creates it, refuses (another syncer holds it),
    /// or claims it. Returns `(acquired, last_changed_at)`.
    pub async fn acquire_lock(pool: &PgPool) -> sqlx::Result<(bool, Option<DateTime<Utc>>)> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query(
            "SELECT sync_status, last_changed_at FROM sync_metadata WHERE id = 1 FOR UPDATE",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let result = match row {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO sync_metadata (id, sync_status, last_sync_at, created_at, updated_at)
                    VALUES (1, 'in_progress', NOW(), NOW(), NOW())
                    "#,
                )
                .execute(&mut *tx)
                .await?;

                (true, None)
            }
            Some(row) => {
                let status: String = row.try_get("sync_status")?;
                if status == "in_progress" {
                    (false, None)
                } else {
                    let last_changed_at: Option<DateTime<Utc>> = row.try_get("last_changed_at")?;

                    sqlx::query(
                        "UPDATE sync_metadata SET sync_status = 'in_progress', last_sync_at = NOW(), updated_at = NOW() WHERE id = 1",
                    )
                    .execute(&mut *tx)
                    .await?;

                    (true, last_changed_at)
                }
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    /// On success, marks `sync_status = success` and advances
    /// `last_changed_at` if provided. On failure, marks `sync_status =
    /// failed`. Commits immediately.
    pub async fn release_lock(
        pool: &PgPool,
        success: bool,
        new_last_changed_at: Option<DateTime<Utc>>,
    ) -> sqlx::Result<()> {
        if success {
            sqlx::query(
                r#"
                UPDATE sync_metadata
                SET sync_status = 'success',
                    last_changed_at = COALESCE($1, last_changed_at),
                    updated_at = NOW()
                WHERE id = 1
                "#,
            )
            .bind(new_last_changed_at)
            .execute(pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE sync_metadata SET sync_status = 'failed', updated_at = NOW() WHERE id = 1",
            )
            .execute(pool)
            .await?;
        }

        Ok(())
    }

    /// Operator-level recovery for a syncer that crashed while holding the
    /// lock, leaving `sync_status = in_progress` stuck. Used by the
    /// `outbox-reset-tool` binary's sync-lock reset subcommand.
    pub async fn force_reset(pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE sync_metadata SET sync_status = 'failed', updated_at = NOW() WHERE id = 1 AND sync_status = 'in_progress'",
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
