use crate::config::StaticConfig;
use crate::context::BeanContext;
use crate::wiring::{WiringConditions, WiringReport, wire_prometheus_export};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[cfg(feature = "metrics")]
use crate::metrics::{PrometheusConfig, ProcessMetrics, ScrapeEndpoint};

pub struct StartupContext {
    pub report: WiringReport,
    pub scrape_path: String,
    #[cfg(feature = "metrics")]
    pub endpoint: Option<Arc<ScrapeEndpoint>>,
    /// Background refresh of process metrics, aborted on shutdown
    pub background_tasks: Vec<JoinHandle<()>>,
}

/// 准备服务器启动的上下文
///
/// Runs the exporter wiring against `context`, which may already hold beans
/// supplied by an embedding application, then starts background tasks.
/// Must be called from within a tokio runtime.
pub async fn prepare_server_startup(
    config: &StaticConfig,
    context: Arc<BeanContext>,
) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let conditions = WiringConditions::from_config(config);
    debug!("Wiring conditions: {:?}", conditions);

    let report = wire_prometheus_export(&context, &conditions, config)
        .context("Failed to wire Prometheus metrics export")?;

    #[allow(unused_mut)]
    let mut background_tasks = Vec::new();

    #[cfg(feature = "metrics")]
    if let (Some(process), Some(prometheus_config)) = (
        context.get::<ProcessMetrics>(),
        context.get::<dyn PrometheusConfig>(),
    ) {
        let step = prometheus_config.step();
        debug!("Refreshing process metrics every {:?}", step);
        background_tasks.push(process.spawn_updater(step));
    }

    #[cfg(feature = "metrics")]
    let endpoint = context.get::<ScrapeEndpoint>();

    let scrape_path = config.management.endpoints.scrape_path();
    #[cfg(feature = "metrics")]
    if endpoint.is_some() {
        info!("Prometheus scrape endpoint available at: {}", scrape_path);
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        report,
        scrape_path,
        #[cfg(feature = "metrics")]
        endpoint,
        background_tasks,
    })
}
