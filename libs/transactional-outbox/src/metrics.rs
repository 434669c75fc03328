use prometheus::{IntCounter, Opts};
use tracing::warn;

#[derive(Clone)]
pub struct OutboxMetrics {
    pub ticks: IntCounter,
    pub sent: IntCounter,
    pub failed: IntCounter,
    pub trimmed_total: IntCounter,
}

impl OutboxMetrics {
    pub fn new(service: &str) -> Self {
        let registry = prometheus::default_registry();

        let ticks = IntCounter::with_opts(
            Opts::new("outbox_worker_ticks_total", "Number of outbox worker batch ticks processed")
                .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for outbox_worker_ticks_total");

        let sent = IntCounter::with_opts(
            Opts::new("outbox_sent_total", "Total number of outbox records delivered successfully")
                .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for outbox_sent_total");

        let failed = IntCounter::with_opts(
            Opts::new("outbox_failed_total", "Total number of outbox records parked as failed")
                .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for outbox_failed_total");

        let trimmed_total = IntCounter::with_opts(
            Opts::new("outbox_trimmed_total", "Total number of sent outbox records removed by retention cleanup")
                .const_label("service", service.to_string()),
        )
        .expect("valid metric opts for outbox_trimmed_total");

        for metric in [
            Box::new(ticks.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(sent.clone()),
            Box::new(failed.clone()),
            Box::new(trimmed_total.clone()),
        ] {
            if let Err(e) = registry.register(metric) {
                warn!("Failed to register outbox metric: {}", e);
            }
        }

        Self {
            ticks,
            sent,
            failed,
            trimmed_total,
        }
    }
}
