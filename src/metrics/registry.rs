//! Process-wide metric registry
//!
//! Thin owner of a `prometheus::Registry`. Producers register collectors
//! into it, the scrape endpoint gathers from it. Both sides share one
//! instance through an `Arc`.

use prometheus::core::Collector;
use prometheus::proto::MetricFamily;
use prometheus::Registry;

use crate::errors::Result;

pub struct PrometheusRegistry {
    inner: Registry,
}

impl PrometheusRegistry {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Wrap a registry the embedding application already owns
    pub fn with_registry(inner: Registry) -> Self {
        Self { inner }
    }

    pub fn register(&self, collector: Box<dyn Collector>) -> Result<()> {
        self.inner.register(collector)?;
        Ok(())
    }

    /// Snapshot of every family with at least one sample, sorted by name
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.inner.gather()
    }
}

impl Default for PrometheusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
