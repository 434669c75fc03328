/// Wires `transactional-outbox`'s generic repository/worker to this domain's
/// notifier, following the `"ticket_created" -> notification"` contract.
use crate::notifier::CapashinoClient;
use async_trait::async_trait;
use transactional_outbox::{OutboxNotifier, OutboxRecord, OutboxResult};

pub struct CapashinoOutboxNotifier {
    client: CapashinoClient,
}

impl CapashinoOutboxNotifier {
    pub fn new(client: CapashinoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OutboxNotifier for CapashinoOutboxNotifier {
    async fn notify(&self, record: &OutboxRecord) -> OutboxResult<bool> {
        let ticket_id = record
            .payload
            .get("ticket_id")
            .and_then(|v| v.as_str())
            .unwrap_or("?");

        let message = format!("Вы успешно зарегистрированы на мероприятие (билет {ticket_id})");
        let idempotency_key = format!("outbox_{}", record.id);

        match self
            .client
            .send_notification(&message, ticket_id, &idempotency_key)
            .await
        {
            Ok(success) => Ok(success),
            Err(e) => Ok({
                tracing::warn!(event_id = %record.id, error = %e, "notifier transport error");
                false
            }),
        }
    }
}
