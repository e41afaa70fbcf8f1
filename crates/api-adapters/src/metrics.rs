//! Prometheus counters for the service boundary.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

pub struct Metrics {
    registry: Registry,
    pub threads_created: Counter,
    pub answers_submitted: Counter,
    pub likes_toggled: Counter,
    pub events_completed: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let threads_created = Counter::default();
        registry.register(
            "ogirihub_threads_created",
            "Threads created through the API",
            threads_created.clone(),
        );
        let answers_submitted = Counter::default();
        registry.register(
            "ogirihub_answers_submitted",
            "Ogiri answers accepted",
            answers_submitted.clone(),
        );
        let likes_toggled = Counter::default();
        registry.register(
            "ogirihub_likes_toggled",
            "Like toggles applied",
            likes_toggled.clone(),
        );
        let events_completed = Counter::default();
        registry.register(
            "ogirihub_events_completed",
            "Ogiri events transitioned to completed via the API read path",
            events_completed.clone(),
        );

        Self {
            registry,
            threads_created,
            answers_submitted,
            likes_toggled,
            events_completed,
        }
    }

    /// Text-format exposition for the `/metrics` endpoint.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
