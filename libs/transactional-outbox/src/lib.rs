//! # Transactional Outbox Pattern Implementation
//!
//! This library guarantees that a business-logic write and the notification
//! that should follow it are never split by a crash: both land in the same
//! database transaction, and a background worker drains the outbox table
//! afterwards.
//!
//! ## What is the Transactional Outbox pattern?
//!
//! 1. Business logic changes (table writes) and an outbox row are inserted in
//!    the same transaction.
//! 2. A background worker claims `pending` rows and calls a downstream
//!    notifier for each.
//! 3. A row is marked `sent` on success, or retried up to a cap before being
//!    parked `failed`.
//!
//! This guarantees **at-least-once delivery** and prevents silent event loss
//! even if the service crashes between commit and notifier call, or the
//! notifier is briefly unavailable.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use transactional_outbox::{OutboxRepository, SqlxOutboxRepository};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! async fn create_ticket(
//!     pool: &PgPool,
//!     outbox_repo: &SqlxOutboxRepository,
//!     ticket_id: Uuid,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!
//!     sqlx::query("INSERT INTO tickets (ticket_id) VALUES ($1)")
//!         .bind(ticket_id)
//!         .execute(&mut *tx)
//!         .await?;
//!
//!     outbox_repo
//!         .create(&mut tx, "ticket_created", serde_json::json!({ "ticket_id": ticket_id }))
//!         .await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub mod error;
pub mod metrics;

pub use error::{OutboxError, OutboxResult};

/// Lifecycle state of an outbox row. See `OutboxRecord.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Sent => "sent",
            OutboxStatus::Failed => "failed",
        })
    }
}

impl FromStr for OutboxStatus {
    type Err = OutboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OutboxStatus::Pending),
            "sent" => Ok(OutboxStatus::Sent),
            "failed" => Ok(OutboxStatus::Failed),
            other => Err(OutboxError::InvalidStatus(other.to_string())),
        }
    }
}

/// A row in the outbox table.
///
/// Created within the same transaction as the business-logic write it
/// accompanies, later claimed and delivered by [`OutboxWorker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for the durable outbox queue.
///
/// Abstracted behind a trait so the worker can be driven by a fake in tests
/// without a live database.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Insert a `pending` row. MUST be called within the caller's own
    /// transaction so the insert is atomic with the business write.
    async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_type: &str,
        payload: serde_json::Value,
    ) -> OutboxResult<OutboxRecord>;

    /// Claim up to `limit` pending rows, oldest first, skipping rows another
    /// worker already holds (`FOR UPDATE SKIP LOCKED`).
    async fn get_pending(&self, limit: i64) -> OutboxResult<Vec<OutboxRecord>>;

    /// Mark a row delivered.
    async fn mark_sent(&self, id: Uuid) -> OutboxResult<()>;

    /// Increment the retry counter and keep the row `pending`.
    async fn increment_retry(&self, id: Uuid) -> OutboxResult<()>;

    /// Park a row permanently. Terminal — never transitions back.
    async fn mark_failed(&self, id: Uuid) -> OutboxResult<()>;

    /// Delete `sent` rows older than `days_to_keep`; returns the count
    /// removed.
    async fn count_deleted_tasks(&self, days_to_keep: i64) -> OutboxResult<u64>;
}

/// SQLx-backed implementation of [`OutboxRepository`] over PostgreSQL.
pub struct SqlxOutboxRepository {
    pool: PgPool,
}

impl SqlxOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: sqlx::postgres::PgRow) -> OutboxResult<OutboxRecord> {
        let status_str: String = row.try_get("status")?;
        Ok(OutboxRecord {
            id: row.try_get("id")?,
            event_type: row.try_get("event_type")?,
            payload: row.try_get("payload")?,
            status: status_str.parse()?,
            retry_count: row.try_get("retry_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl OutboxRepository for SqlxOutboxRepository {
    async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_type: &str,
        payload: serde_json::Value,
    ) -> OutboxResult<OutboxRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO outbox_records (id, event_type, payload, status, retry_count, created_at, updated_at)
            VALUES ($1, $2, $3, 'pending', 0, NOW(), NOW())
            RETURNING id, event_type, payload, status, retry_count, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_type)
        .bind(&payload)
        .fetch_one(&mut **tx)
        .await?;

        let record = Self::row_to_record(row)?;
        debug!(event_id = %record.id, event_type, "outbox record created");
        Ok(record)
    }

    async fn get_pending(&self, limit: i64) -> OutboxResult<Vec<OutboxRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_type, payload, status, retry_count, created_at, updated_at
            FROM outbox_records
            WHERE status = 'pending'
            ORDER BY created_at ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_record).collect()
    }

    async fn mark_sent(&self, id: Uuid) -> OutboxResult<()> {
        let result = sqlx::query(
            "UPDATE outbox_records SET status = 'sent', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::RecordNotFound(id));
        }
        debug!(event_id = %id, "outbox record marked sent");
        Ok(())
    }

    async fn increment_retry(&self, id: Uuid) -> OutboxResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE outbox_records
            SET retry_count = retry_count + 1, status = 'pending', updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::RecordNotFound(id));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid) -> OutboxResult<()> {
        let result = sqlx::query(
            "UPDATE outbox_records SET status = 'failed', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OutboxError::RecordNotFound(id));
        }
        warn!(event_id = %id, "outbox record parked as failed (max retries reached)");
        Ok(())
    }

    async fn count_deleted_tasks(&self, days_to_keep: i64) -> OutboxResult<u64> {
        let cutoff = Utc::now() - ChronoDuration::days(days_to_keep);

        let result = sqlx::query(
            "DELETE FROM outbox_records WHERE status = 'sent' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Downstream delivery target for an outbox record.
///
/// Implementations should treat delivery as idempotent: the worker retries
/// on `Ok(false)` or `Err`, so the same record may be delivered more than
/// once downstream.
#[async_trait]
pub trait OutboxNotifier: Send + Sync {
    /// Attempt delivery. `Ok(true)` marks the record sent, `Ok(false)` or
    /// `Err` increments its retry counter.
    async fn notify(&self, record: &OutboxRecord) -> OutboxResult<bool>;
}

/// Background worker that drains the outbox.
///
/// Each tick: claim a batch, attempt delivery per record (parking any that
/// exceeded `max_retries`), trim rows that have been `sent` for longer than
/// the retention horizon, then sleep.
pub struct OutboxWorker<R: OutboxRepository, N: OutboxNotifier> {
    repository: Arc<R>,
    notifier: Arc<N>,
    batch_size: i64,
    poll_interval: Duration,
    max_retries: i32,
    days_to_keep: i64,
    metrics: Option<crate::metrics::OutboxMetrics>,
    running: Arc<std::sync::atomic::AtomicBool>,
}

impl<R: OutboxRepository, N: OutboxNotifier> OutboxWorker<R, N> {
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        batch_size: i64,
        poll_interval: Duration,
        max_retries: i32,
        days_to_keep: i64,
    ) -> Self {
        Self {
            repository,
            notifier,
            batch_size,
            poll_interval,
            max_retries,
            days_to_keep,
            metrics: None,
            running: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn with_metrics(mut self, metrics: crate::metrics::OutboxMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Signal the running loop to stop after its current tick.
    pub fn stop(&self) {
        self.running.store(false, std::sync::atomic::Ordering::SeqCst);
    }

    /// Run the drain loop. Intended to be `tokio::spawn`ed; returns once
    /// `stop()` has been called.
    pub async fn start(&self) {
        self.running.store(true, std::sync::atomic::Ordering::SeqCst);
        info!(
            batch_size = self.batch_size,
            poll_interval_secs = self.poll_interval.as_secs(),
            max_retries = self.max_retries,
            "outbox worker starting"
        );

        while self.running.load(std::sync::atomic::Ordering::SeqCst) {
            if let Err(e) = self.tick().await {
                error!(error = ?e, "outbox worker tick failed");
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        info!("outbox worker stopped");
    }

    /// Process a single batch; returns the number of records delivered.
    async fn tick(&self) -> OutboxResult<i64> {
        let pending = self.repository.get_pending(self.batch_size).await?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut delivered = 0;
        for record in &pending {
            self.process_record(record).await;
            if record.retry_count < self.max_retries {
                delivered += 1;
            }
        }

        let trimmed = self.repository.count_deleted_tasks(self.days_to_keep).await?;
        if trimmed > 0 {
            info!(trimmed, days_to_keep = self.days_to_keep, "trimmed sent outbox records");
        }

        if let Some(metrics) = &self.metrics {
            metrics.ticks.inc();
            metrics.trimmed_total.inc_by(trimmed);
        }

        Ok(delivered)
    }

    async fn process_record(&self, record: &OutboxRecord) {
        if record.retry_count >= self.max_retries {
            warn!(
                event_id = %record.id,
                retry_count = record.retry_count,
                max_retries = self.max_retries,
                "outbox record exceeded max retries, parking"
            );
            if let Err(e) = self.repository.mark_failed(record.id).await {
                error!(event_id = %record.id, error = ?e, "failed to park outbox record");
            } else if let Some(metrics) = &self.metrics {
                metrics.failed.inc();
            }
            return;
        }

        match self.notifier.notify(record).await {
            Ok(true) => {
                if let Err(e) = self.repository.mark_sent(record.id).await {
                    error!(event_id = %record.id, error = ?e, "failed to mark outbox record sent");
                } else if let Some(metrics) = &self.metrics {
                    metrics.sent.inc();
                }
            }
            Ok(false) => {
                debug!(event_id = %record.id, "notifier reported failure, retrying");
                if let Err(e) = self.repository.increment_retry(record.id).await {
                    error!(event_id = %record.id, error = ?e, "failed to increment retry count");
                }
            }
            Err(e) => {
                warn!(event_id = %record.id, error = ?e, "notifier call errored, retrying");
                if let Err(inc_err) = self.repository.increment_retry(record.id).await {
                    error!(event_id = %record.id, error = ?inc_err, "failed to increment retry count");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    fn sample_record(id: Uuid, retry_count: i32) -> OutboxRecord {
        OutboxRecord {
            id,
            event_type: "ticket_created".to_string(),
            payload: serde_json::json!({ "ticket_id": id }),
            status: OutboxStatus::Pending,
            retry_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct FakeRepository {
        pending: Mutex<Vec<OutboxRecord>>,
        sent: Mutex<Vec<Uuid>>,
        failed: Mutex<Vec<Uuid>>,
        retried: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl OutboxRepository for FakeRepository {
        async fn create(
            &self,
            _tx: &mut Transaction<'_, Postgres>,
            _event_type: &str,
            _payload: serde_json::Value,
        ) -> OutboxResult<OutboxRecord> {
            unimplemented!("not exercised by worker tests")
        }

        async fn get_pending(&self, limit: i64) -> OutboxResult<Vec<OutboxRecord>> {
            let mut pending = self.pending.lock().unwrap();
            let take = (limit as usize).min(pending.len());
            Ok(pending.drain(..take).collect())
        }

        async fn mark_sent(&self, id: Uuid) -> OutboxResult<()> {
            self.sent.lock().unwrap().push(id);
            Ok(())
        }

        async fn increment_retry(&self, id: Uuid) -> OutboxResult<()> {
            self.retried.lock().unwrap().push(id);
            Ok(())
        }

        async fn mark_failed(&self, id: Uuid) -> OutboxResult<()> {
            self.failed.lock().unwrap().push(id);
            Ok(())
        }

        async fn count_deleted_tasks(&self, _days_to_keep: i64) -> OutboxResult<u64> {
            Ok(0)
        }
    }

    struct AlwaysFailNotifier {
        calls: AtomicI32,
    }

    #[async_trait]
    impl OutboxNotifier for AlwaysFailNotifier {
        async fn notify(&self, _record: &OutboxRecord) -> OutboxResult<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    struct AlwaysSucceedNotifier;

    #[async_trait]
    impl OutboxNotifier for AlwaysSucceedNotifier {
        async fn notify(&self, _record: &OutboxRecord) -> OutboxResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn retry_cap_parks_record_without_calling_notifier_again() {
        let id = Uuid::new_v4();
        let repo = Arc::new(FakeRepository {
            pending: Mutex::new(vec![sample_record(id, 5)]),
            sent: Mutex::new(vec![]),
            failed: Mutex::new(vec![]),
            retried: Mutex::new(vec![]),
        });
        let notifier = Arc::new(AlwaysFailNotifier {
            calls: AtomicI32::new(0),
        });

        let worker = OutboxWorker::new(repo.clone(), notifier.clone(), 10, Duration::from_secs(5), 5, 7);
        worker.tick().await.unwrap();

        assert_eq!(repo.failed.lock().unwrap().len(), 1);
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_notifier_increments_retry_and_stays_pending() {
        let id = Uuid::new_v4();
        let repo = Arc::new(FakeRepository {
            pending: Mutex::new(vec![sample_record(id, 0)]),
            sent: Mutex::new(vec![]),
            failed: Mutex::new(vec![]),
            retried: Mutex::new(vec![]),
        });
        let notifier = Arc::new(AlwaysFailNotifier {
            calls: AtomicI32::new(0),
        });

        let worker = OutboxWorker::new(repo.clone(), notifier, 10, Duration::from_secs(5), 5, 7);
        worker.tick().await.unwrap();

        assert_eq!(repo.retried.lock().unwrap(), vec![id]);
        assert!(repo.sent.lock().unwrap().is_empty());
        assert!(repo.failed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn successful_notify_marks_sent() {
        let id = Uuid::new_v4();
        let repo = Arc::new(FakeRepository {
            pending: Mutex::new(vec![sample_record(id, 0)]),
            sent: Mutex::new(vec![]),
            failed: Mutex::new(vec![]),
            retried: Mutex::new(vec![]),
        });
        let notifier = Arc::new(AlwaysSucceedNotifier);

        let worker = OutboxWorker::new(repo.clone(), notifier, 10, Duration::from_secs(5), 5, 7);
        worker.tick().await.unwrap();

        assert_eq!(repo.sent.lock().unwrap(), vec![id]);
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("pending".parse::<OutboxStatus>().unwrap(), OutboxStatus::Pending);
        assert_eq!("sent".parse::<OutboxStatus>().unwrap(), OutboxStatus::Sent);
        assert_eq!("failed".parse::<OutboxStatus>().unwrap(), OutboxStatus::Failed);
        assert!("bogus".parse::<OutboxStatus>().is_err());
    }
}
