use crate::provider::ProviderClient;
use crate::sync::{engine::SyncOutcome, SyncEngine};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Triggers a full sync run on a fixed interval (default daily).
pub struct SyncScheduler {
    pool: PgPool,
    client: Arc<ProviderClient>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(pool: PgPool, client: Arc<ProviderClient>, interval: Duration) -> Self {
        Self {
            pool,
            client,
            interval,
        }
    }

    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "sync scheduler starting");

        loop {
            tokio::time::sleep(self.interval).await;

            let engine = SyncEngine::new(&self.pool, &self.client);
            match engine.run(None).await {
                Ok(SyncOutcome::Completed { events_upserted }) => {
                    info!(events_upserted, "scheduled sync completed");
                }
                Ok(SyncOutcome::Skipped) => {
                    info!("scheduled sync skipped, lock already held");
                }
                Err(e) => {
                    error!(error = ?e, "scheduled sync failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_daily() {
        assert_eq!(Duration::from_secs(86_400).as_secs(), 86_400);
    }
}
