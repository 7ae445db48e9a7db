//! Startup wiring of the Prometheus exporter
//!
//! Decides once whether the registry, the configuration adapter, the meter
//! registry and the scrape endpoint should exist, and constructs the missing
//! ones in dependency order:
//!
//! Registry → Configuration adapter → Meter registry → Endpoint
//!
//! Beans already present in the [`BeanContext`] are reused, so running the
//! wiring twice never creates duplicates.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::context::{BeanContext, BeanSource};
use crate::errors::Result;
use crate::metrics_core::{MeterRecorder, NoopRecorder};

/// Inputs of the wiring decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WiringConditions {
    /// The exposition library is compiled in
    pub library_present: bool,
    /// Metrics export to Prometheus is switched on
    pub export_enabled: bool,
    /// The scrape endpoint is enabled and exposed over HTTP
    pub endpoint_available: bool,
}

impl WiringConditions {
    /// Whether the `metrics` feature was compiled in
    pub const fn library_present() -> bool {
        cfg!(feature = "metrics")
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        let endpoints = &config.management.endpoints;
        let endpoint_enabled = endpoints
            .prometheus_enabled
            .unwrap_or(endpoints.enabled_by_default);
        Self {
            library_present: Self::library_present(),
            export_enabled: config.management.prometheus_export_enabled(),
            endpoint_available: endpoint_enabled && endpoints.exposure.is_exposed(ENDPOINT_ID),
        }
    }
}

/// Matches the endpoint id in `metrics::endpoint`, available without the feature
const ENDPOINT_ID: &str = "prometheus";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    LibraryAbsent,
    ExportDisabled,
}

/// What the wiring did, per bean. `None` means the bean was not wired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WiringReport {
    pub skipped: Option<SkipReason>,
    pub registry: Option<BeanSource>,
    pub config: Option<BeanSource>,
    pub clock: Option<BeanSource>,
    pub meter_registry: Option<BeanSource>,
    pub process_metrics: Option<BeanSource>,
    pub endpoint: Option<BeanSource>,
}

impl WiringReport {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// Number of beans constructed by this run
    pub fn created_count(&self) -> usize {
        [
            self.registry,
            self.config,
            self.clock,
            self.meter_registry,
            self.process_metrics,
            self.endpoint,
        ]
        .iter()
        .filter(|s| **s == Some(BeanSource::Created))
        .count()
    }
}

/// Wire the Prometheus exporter beans into `ctx`.
///
/// Library absent or export disabled skips silently. Errors only come from
/// constructing a bean, e.g. an invalid step or a name clash in a supplied
/// registry.
pub fn wire_prometheus_export(
    ctx: &BeanContext,
    conditions: &WiringConditions,
    config: &StaticConfig,
) -> Result<WiringReport> {
    if !conditions.library_present {
        debug!("Prometheus library not present, skipping metrics export wiring");
        return Ok(WiringReport::skipped(SkipReason::LibraryAbsent));
    }
    if !conditions.export_enabled {
        info!("Prometheus metrics export disabled");
        return Ok(WiringReport::skipped(SkipReason::ExportDisabled));
    }

    let report = wire_beans(ctx, conditions, config)?;
    debug!("Prometheus wiring finished: {:?}", report);
    ctx.debug_beans();
    Ok(report)
}

#[cfg(feature = "metrics")]
fn wire_beans(
    ctx: &BeanContext,
    conditions: &WiringConditions,
    config: &StaticConfig,
) -> Result<WiringReport> {
    use crate::clock::{Clock, SystemClock};
    use crate::metrics::{
        ExpositionSettings, PrometheusConfig, PrometheusMeterRegistry, PrometheusRegistry,
        ProcessMetrics, PropertiesConfigAdapter, ScrapeEndpoint,
    };

    let mut report = WiringReport::default();

    let (registry, source) =
        ctx.get_or_register_with::<PrometheusRegistry, _>(|| Ok(Arc::new(PrometheusRegistry::new())))?;
    report.registry = Some(source);

    let (prometheus_config, source) = ctx.get_or_register_with::<dyn PrometheusConfig, _>(|| {
        let adapter: Arc<dyn PrometheusConfig> = Arc::new(PropertiesConfigAdapter::new(
            config.management.prometheus.clone(),
        ));
        Ok(adapter)
    })?;
    report.config = Some(source);

    let (clock, source) = ctx.get_or_register_with::<dyn Clock, _>(|| Ok(SystemClock::arc()))?;
    report.clock = Some(source);

    let (_, source) = ctx.get_or_register_with::<PrometheusMeterRegistry, _>(|| {
        Ok(Arc::new(PrometheusMeterRegistry::new(
            prometheus_config.clone(),
            registry.clone(),
            clock.clone(),
        )?))
    })?;
    report.meter_registry = Some(source);

    if config.management.prometheus.process_metrics {
        let namespace = prometheus_config.namespace();
        let (_, source) = ctx.get_or_register_with::<ProcessMetrics, _>(|| {
            let metrics = Arc::new(ProcessMetrics::new(namespace.as_deref(), clock.clone())?);
            metrics.register(&registry)?;
            Ok(metrics)
        })?;
        report.process_metrics = Some(source);
    }

    if conditions.endpoint_available {
        let (_, source) = ctx.get_or_register_with::<ScrapeEndpoint, _>(|| {
            let settings = ExpositionSettings::from_config(&config.exposition);
            Ok(Arc::new(ScrapeEndpoint::new(
                registry.clone(),
                Arc::new(settings),
            )))
        })?;
        report.endpoint = Some(source);
    } else {
        debug!("Prometheus scrape endpoint not available, not exposing it");
    }

    info!(
        "Prometheus metrics export wired ({} bean(s) created)",
        report.created_count()
    );
    Ok(report)
}

#[cfg(not(feature = "metrics"))]
fn wire_beans(
    _ctx: &BeanContext,
    _conditions: &WiringConditions,
    _config: &StaticConfig,
) -> Result<WiringReport> {
    debug!("Built without the `metrics` feature, skipping metrics export wiring");
    Ok(WiringReport::skipped(SkipReason::LibraryAbsent))
}

/// The recorder producers should write through: the wired meter registry,
/// or a no-op when nothing was wired.
pub fn recorder_from_context(ctx: &BeanContext) -> Arc<dyn MeterRecorder> {
    #[cfg(feature = "metrics")]
    if let Some(meters) = ctx.get::<crate::metrics::PrometheusMeterRegistry>() {
        return meters;
    }
    #[cfg(not(feature = "metrics"))]
    let _ = ctx;

    NoopRecorder::arc()
}
