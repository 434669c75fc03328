use crate::models::ProviderEventPayload;
use crate::provider::{ProviderClient, ProviderError};
use std::collections::VecDeque;

/// A lazy, restartable cursor over the provider's `/events` endpoint.
///
/// Yields one event payload at a time; never buffers more than the page it
/// is currently draining.
pub struct EventsPaginator<'a> {
    client: &'a ProviderClient,
    changed_at: Option<String>,
    next_url: Option<String>,
    buffer: VecDeque<ProviderEventPayload>,
    started: bool,
    exhausted: bool,
}

impl<'a> EventsPaginator<'a> {
    pub fn new(client: &'a ProviderClient, changed_at: Option<String>) -> Self {
        Self {
            client,
            changed_at,
            next_url: None,
            buffer: VecDeque::new(),
            started: false,
            exhausted: false,
        }
    }

    /// Pull the next event payload, fetching another page if the current
    /// buffer is drained. Returns `None` once the provider reports no
    /// further `next` cursor.
    pub async fn next_event(&mut self) -> Result<Option<ProviderEventPayload>, ProviderError> {
        if let Some(event) = self.buffer.pop_front() {
            return Ok(Some(event));
        }

        if self.exhausted {
            return Ok(None);
        }

        if self.started && self.next_url.is_none() {
            self.exhausted = true;
            return Ok(None);
        }

        let page = self
            .client
            .get_events_page(self.changed_at.as_deref(), self.next_url.as_deref())
            .await?;

        self.started = true;
        self.next_url = page.next;
        self.buffer = page.results.into_iter().collect();

        if self.buffer.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        Ok(self.buffer.pop_front())
    }
}
