//! Meter registry backed by the shared Prometheus registry
//!
//! Creates named instruments on demand and registers them into the
//! [`PrometheusRegistry`] the scrape endpoint reads. Instrument identity is
//! the Prometheus name; asking for it again returns the same instrument.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use prometheus::{CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts};
use std::sync::Arc;
use std::time::Duration;

use super::adapter::PrometheusConfig;
use super::naming::{MeterKind, prometheus_name, sanitize_label};
use super::registry::PrometheusRegistry;
use crate::clock::Clock;
use crate::config::HistogramFlavor;
use crate::errors::{PromgateError, Result};
use crate::metrics_core::{Labels, MeterRecorder};

/// HELP text used when descriptions are disabled (must be non-empty)
const BLANK_HELP: &str = " ";

static EXPONENTIAL_BUCKETS: Lazy<Vec<f64>> = Lazy::new(|| {
    prometheus::exponential_buckets(0.001, 2.0, 16).unwrap_or_else(|e| {
        tracing::error!("Failed to build exponential buckets: {}", e);
        prometheus::DEFAULT_BUCKETS.to_vec()
    })
});

/// Bucket upper bounds for a histogram flavor
pub fn buckets_for(flavor: HistogramFlavor) -> Vec<f64> {
    match flavor {
        HistogramFlavor::Prometheus => prometheus::DEFAULT_BUCKETS.to_vec(),
        HistogramFlavor::Exponential => EXPONENTIAL_BUCKETS.clone(),
    }
}

#[derive(Clone)]
enum Instrument {
    Counter(CounterVec),
    Gauge(GaugeVec),
    Histogram(HistogramVec),
}

#[derive(Clone)]
struct MeterEntry {
    kind: MeterKind,
    label_names: Vec<String>,
    instrument: Instrument,
}

/// Histogram in seconds that measures with the registry clock
#[derive(Clone)]
pub struct Timer {
    histogram: HistogramVec,
    clock: Arc<dyn Clock>,
}

impl Timer {
    /// Run `f` and record how long it took
    pub fn record<R>(&self, label_values: &[&str], f: impl FnOnce() -> R) -> R {
        let start = self.clock.monotonic_nanos();
        let result = f();
        let elapsed = self.clock.monotonic_nanos().saturating_sub(start);
        self.record_duration(label_values, Duration::from_nanos(elapsed));
        result
    }

    pub fn record_duration(&self, label_values: &[&str], duration: Duration) {
        match self.histogram.get_metric_with_label_values(label_values) {
            Ok(h) => h.observe(duration.as_secs_f64()),
            Err(e) => tracing::warn!("Failed to record timer sample: {}", e),
        }
    }

    pub fn histogram(&self) -> &HistogramVec {
        &self.histogram
    }
}

pub struct PrometheusMeterRegistry {
    registry: Arc<PrometheusRegistry>,
    config: Arc<dyn PrometheusConfig>,
    clock: Arc<dyn Clock>,
    namespace: Option<String>,
    buckets: Vec<f64>,
    meters: DashMap<String, MeterEntry>,
}

impl PrometheusMeterRegistry {
    pub fn new(
        config: Arc<dyn PrometheusConfig>,
        registry: Arc<PrometheusRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let namespace = config.namespace();
        let buckets = buckets_for(config.histogram_flavor());
        Ok(Self {
            registry,
            config,
            clock,
            namespace,
            buckets,
            meters: DashMap::new(),
        })
    }

    pub fn registry(&self) -> &Arc<PrometheusRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Arc<dyn PrometheusConfig> {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Number of meters created through this registry
    pub fn meter_count(&self) -> usize {
        self.meters.len()
    }

    pub fn counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<CounterVec> {
        match self.get_or_create(name, help, label_names, MeterKind::Counter)? {
            Instrument::Counter(c) => Ok(c),
            _ => unreachable!("counter entry holds a counter"),
        }
    }

    pub fn gauge(&self, name: &str, help: &str, label_names: &[&str]) -> Result<GaugeVec> {
        match self.get_or_create(name, help, label_names, MeterKind::Gauge)? {
            Instrument::Gauge(g) => Ok(g),
            _ => unreachable!("gauge entry holds a gauge"),
        }
    }

    pub fn histogram(&self, name: &str, help: &str, label_names: &[&str]) -> Result<HistogramVec> {
        match self.get_or_create(name, help, label_names, MeterKind::Histogram)? {
            Instrument::Histogram(h) => Ok(h),
            _ => unreachable!("histogram entry holds a histogram"),
        }
    }

    pub fn timer(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Timer> {
        match self.get_or_create(name, help, label_names, MeterKind::Timer)? {
            Instrument::Histogram(histogram) => Ok(Timer {
                histogram,
                clock: self.clock.clone(),
            }),
            _ => unreachable!("timer entry holds a histogram"),
        }
    }

    fn get_or_create(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        kind: MeterKind,
    ) -> Result<Instrument> {
        let full_name = prometheus_name(self.namespace.as_deref(), name, kind);
        let labels: Vec<String> = label_names.iter().map(|l| sanitize_label(l)).collect();

        // The shard lock is held across creation so concurrent callers
        // cannot both register the same name.
        let entry = self.meters.entry(full_name.clone()).or_try_insert_with(|| {
            let instrument = self.build(&full_name, help, &labels, kind)?;
            tracing::debug!("Registered {} {}", kind.as_str(), full_name);
            Ok::<_, PromgateError>(MeterEntry {
                kind,
                label_names: labels.clone(),
                instrument,
            })
        })?;

        if entry.kind != kind {
            return Err(PromgateError::meter_conflict(format!(
                "{} is already registered as a {}, requested {}",
                full_name,
                entry.kind.as_str(),
                kind.as_str()
            )));
        }
        if entry.label_names != labels {
            return Err(PromgateError::meter_conflict(format!(
                "{} is already registered with labels {:?}, requested {:?}",
                full_name, entry.label_names, labels
            )));
        }
        Ok(entry.instrument.clone())
    }

    fn build(
        &self,
        full_name: &str,
        help: &str,
        labels: &[String],
        kind: MeterKind,
    ) -> Result<Instrument> {
        let help = if self.config.descriptions() && !help.trim().is_empty() {
            help
        } else {
            BLANK_HELP
        };
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();

        let instrument = match kind {
            MeterKind::Counter => {
                let counter = CounterVec::new(Opts::new(full_name, help), &label_refs)?;
                self.registry.register(Box::new(counter.clone()))?;
                Instrument::Counter(counter)
            }
            MeterKind::Gauge => {
                let gauge = GaugeVec::new(Opts::new(full_name, help), &label_refs)?;
                self.registry.register(Box::new(gauge.clone()))?;
                Instrument::Gauge(gauge)
            }
            MeterKind::Histogram | MeterKind::Timer => {
                let opts = HistogramOpts::new(full_name, help).buckets(self.buckets.clone());
                let histogram = HistogramVec::new(opts, &label_refs)?;
                self.registry.register(Box::new(histogram.clone()))?;
                Instrument::Histogram(histogram)
            }
        };
        Ok(instrument)
    }
}

fn split_labels<'a>(labels: Labels<'a>) -> (Vec<&'a str>, Vec<&'a str>) {
    labels.iter().map(|(k, v)| (*k, *v)).unzip()
}

impl MeterRecorder for PrometheusMeterRegistry {
    fn increment_counter(&self, name: &str, labels: Labels<'_>, value: f64) {
        if value < 0.0 {
            tracing::warn!("Ignoring negative increment {} for counter {}", value, name);
            return;
        }
        let (names, values) = split_labels(labels);
        let result = self.counter(name, name, &names).and_then(|c| {
            c.get_metric_with_label_values(&values)
                .map(|m| m.inc_by(value))
                .map_err(PromgateError::from)
        });
        if let Err(e) = result {
            tracing::warn!("Failed to increment counter {}: {}", name, e);
        }
    }

    fn set_gauge(&self, name: &str, labels: Labels<'_>, value: f64) {
        let (names, values) = split_labels(labels);
        let result = self.gauge(name, name, &names).and_then(|g| {
            g.get_metric_with_label_values(&values)
                .map(|m| m.set(value))
                .map_err(PromgateError::from)
        });
        if let Err(e) = result {
            tracing::warn!("Failed to set gauge {}: {}", name, e);
        }
    }

    fn observe_histogram(&self, name: &str, labels: Labels<'_>, value: f64) {
        let (names, values) = split_labels(labels);
        let result = self.histogram(name, name, &names).and_then(|h| {
            h.get_metric_with_label_values(&values)
                .map(|m| m.observe(value))
                .map_err(PromgateError::from)
        });
        if let Err(e) = result {
            tracing::warn!("Failed to observe histogram {}: {}", name, e);
        }
    }
}
