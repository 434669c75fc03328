use crate::db::{PlaceRepository, SyncMetadataRepository};
use crate::models::Event;
use crate::provider::{EventsPaginator, ProviderClient};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{error, info};

/// Result of a sync run attempt. `Skipped` means another syncer held the
/// lock — not an error (see `pipeline::create`'s on-demand sync trigger).
#[derive(Debug)]
pub enum SyncOutcome {
    Completed { events_upserted: usize },
    Skipped,
}

/// Pulls changed events, upserts places and events, advances the watermark.
///
/// Multiple sync runs never execute concurrently — guaranteed by
/// [`SyncMetadataRepository`]'s lock.
pub struct SyncEngine<'a> {
    pool: &'a PgPool,
    client: &'a ProviderClient,
}

impl<'a> SyncEngine<'a> {
    pub fn new(pool: &'a PgPool, client: &'a ProviderClient) -> Self {
        Self { pool, client }
    }

    pub async fn run(
        &self,
        forced_changed_at: Option<DateTime<Utc>>,
    ) -> Result<SyncOutcome, crate::AppError> {
        let (acquired, last_changed_at) = SyncMetadataRepository::acquire_lock(self.pool).await?;
        if !acquired {
            info!("sync lock already held, skipping run");
            return Ok(SyncOutcome::Skipped);
        }

        match self.do_sync(forced_changed_at, last_changed_at).await {
            Ok((count, max_changed_at)) => {
                SyncMetadataRepository::release_lock(
                    self.pool,
                    true,
                    max_changed_at.or(last_changed_at),
                )
                .await?;
                Ok(SyncOutcome::Completed {
                    events_upserted: count,
                })
            }
            Err(e) => {
                error!(error = ?e, "sync run failed");
                SyncMetadataRepository::release_lock(self.pool, false, None).await?;
                Err(e)
            }
        }
    }

    async fn do_sync(
        &self,
        forced_changed_at: Option<DateTime<Utc>>,
        last_changed_at: Option<DateTime<Utc>>,
    ) -> Result<(usize, Option<DateTime<Utc>>), crate::AppError> {
        let changed_at_filter: String = match forced_changed_at {
            Some(dt) => dt.date_naive().to_string(),
            None => last_changed_at
                .map(|dt| dt.date_naive().to_string())
                .unwrap_or_else(|| {
                    NaiveDate::from_ymd_opt(2000, 1, 1)
                        .expect("2000-01-01 is a valid date")
                        .to_string()
                }),
        };

        let mut paginator = EventsPaginator::new(self.client, Some(changed_at_filter));
        let mut max_changed_at: Option<DateTime<Utc>> = None;
        let mut upserted = 0usize;

        let mut tx = self.pool.begin().await?;

        while let Some(payload) = paginator.next_event().await? {
            if let Some(watermark) = last_changed_at {
                if payload.changed_at <= watermark {
                    continue;
                }
            }

            PlaceRepository::upsert(&mut tx, &payload.place.clone().into()).await?;

            let event = Event {
                id: payload.id,
                name: payload.name,
                event_time: payload.event_time,
                place_id: payload.place.id,
                registration_deadline: payload.registration_deadline,
                status: payload.status,
                number_of_visitors: payload.number_of_visitors,
                created_at: payload.created_at,
                changed_at: payload.changed_at,
                status_changed_at: payload.status_changed_at,
            };
            crate::db::EventRepository::upsert(&mut tx, &event).await?;

            max_changed_at = Some(match max_changed_at {
                Some(current) => current.max(payload.changed_at),
                None => payload.changed_at,
            });
            upserted += 1;
        }

        tx.commit().await?;

        Ok((upserted, max_changed_at))
    }
}
