//! Prometheus metrics module
//!
//! Registry, configuration adapter, meter registry and scrape endpoint.
//! Which of them exist at runtime is decided by [`crate::wiring`].
//!
//! # Feature
//! This module requires the `metrics` feature to be enabled.

pub mod adapter;
pub mod endpoint;
pub mod meter;
pub mod naming;
pub mod registry;
pub mod system;

pub use adapter::{DefaultPrometheusConfig, PrometheusConfig, PropertiesConfigAdapter};
pub use endpoint::{
    ENDPOINT_ID, ExpositionSettings, MetricNameFilter, ScrapeEndpoint, ScrapeOutput,
    TEXT_CONTENT_TYPE, encode_text,
};
pub use meter::{PrometheusMeterRegistry, Timer};
pub use registry::PrometheusRegistry;
pub use system::ProcessMetrics;
