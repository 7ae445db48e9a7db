//! Exporter configuration and the adapter from bound properties
//!
//! [`PrometheusConfig`] is the shape the meter registry consumes. Every method
//! has a default; [`PropertiesConfigAdapter`] answers from the user's
//! `[management.prometheus]` properties and falls back to those defaults.

use std::time::Duration;

use crate::config::{HistogramFlavor, PrometheusProperties};
use crate::errors::{PromgateError, Result};
use crate::utils::{format_duration, parse_duration};

pub trait PrometheusConfig: Send + Sync {
    /// Property prefix, used in diagnostics
    fn prefix(&self) -> &str {
        "prometheus"
    }

    fn step(&self) -> Duration {
        Duration::from_secs(60)
    }

    /// Whether HELP text is published
    fn descriptions(&self) -> bool {
        true
    }

    fn histogram_flavor(&self) -> HistogramFlavor {
        HistogramFlavor::Prometheus
    }

    /// Prepended to every meter name
    fn namespace(&self) -> Option<String> {
        None
    }

    fn validate(&self) -> Result<()> {
        if self.step().is_zero() {
            return Err(PromgateError::validation(format!(
                "{}.step must be greater than zero",
                self.prefix()
            )));
        }
        Ok(())
    }
}

/// Config with every value at its default
pub struct DefaultPrometheusConfig;

impl PrometheusConfig for DefaultPrometheusConfig {}

/// Maps [`PrometheusProperties`] onto [`PrometheusConfig`]
pub struct PropertiesConfigAdapter {
    properties: PrometheusProperties,
    step: Option<Duration>,
}

impl PropertiesConfigAdapter {
    pub fn new(properties: PrometheusProperties) -> Self {
        let step = match parse_duration(&properties.step) {
            Ok(step) => Some(step),
            Err(e) => {
                tracing::warn!(
                    "Invalid prometheus.step '{}': {}, using default",
                    properties.step,
                    e
                );
                None
            }
        };
        Self { properties, step }
    }

    pub fn properties(&self) -> &PrometheusProperties {
        &self.properties
    }
}

impl PrometheusConfig for PropertiesConfigAdapter {
    fn step(&self) -> Duration {
        self.step
            .unwrap_or_else(|| DefaultPrometheusConfig.step())
    }

    fn descriptions(&self) -> bool {
        self.properties.descriptions
    }

    fn histogram_flavor(&self) -> HistogramFlavor {
        self.properties.histogram_flavor
    }

    fn namespace(&self) -> Option<String> {
        self.properties
            .prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }
}

impl std::fmt::Debug for PropertiesConfigAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertiesConfigAdapter")
            .field("step", &format_duration(self.step()))
            .field("descriptions", &self.descriptions())
            .field("histogram_flavor", &self.histogram_flavor())
            .field("namespace", &self.namespace())
            .finish()
    }
}
