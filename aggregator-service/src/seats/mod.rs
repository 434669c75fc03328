/// Process-local TTL cache of available seats per event.
use crate::provider::{ProviderClient, ProviderError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Process-wide mapping `event_id -> (cached_at, seats)`, protected by one
/// mutex. Cache misses are not coalesced across concurrent callers — the
/// mutex only guards the map, not the upstream call.
pub struct SeatsCache {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, (Instant, Vec<String>)>>,
}

impl SeatsCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ttl: DEFAULT_TTL,
            entries: Mutex::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    pub fn with_ttl(ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Return the cached seat list if still fresh, otherwise fetch from the
    /// provider, store under the lock, and return it. Errors bubble up
    /// unchanged; nothing is cached on failure.
    pub async fn get_available_seats(
        &self,
        client: &ProviderClient,
        event_id: Uuid,
    ) -> Result<Vec<String>, ProviderError> {
        {
            let entries = self.entries.lock().await;
            if let Some((cached_at, seats)) = entries.get(&event_id) {
                if cached_at.elapsed() < self.ttl {
                    return Ok(seats.clone());
                }
            }
        }

        let seats = client.get_event_seats(event_id).await?;

        let mut entries = self.entries.lock().await;
        entries.insert(event_id, (Instant::now(), seats.clone()));

        Ok(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_entry_served_without_another_lookup() {
        let cache = SeatsCache::with_ttl(Duration::from_secs(30));
        {
            let mut entries = cache.entries.lock().await;
            entries.insert(Uuid::nil(), (Instant::now(), vec!["A1".to_string()]));
        }

        let entries = cache.entries.lock().await;
        let (cached_at, seats) = entries.get(&Uuid::nil()).unwrap();
        assert!(cached_at.elapsed() < cache.ttl);
        assert_eq!(seats, &vec!["A1".to_string()]);
    }

    #[tokio::test]
    async fn stale_entry_is_treated_as_expired() {
        let cache = SeatsCache::with_ttl(Duration::from_millis(1));
        {
            let mut entries = cache.entries.lock().await;
            entries.insert(Uuid::nil(), (Instant::now(), vec!["A1".to_string()]));
        }
        tokio::time::sleep(Duration::from_millis(5)).await;

        let entries = cache.entries.lock().await;
        let (cached_at, _) = entries.get(&Uuid::nil()).unwrap();
        assert!(cached_at.elapsed() >= cache.ttl);
    }
}
