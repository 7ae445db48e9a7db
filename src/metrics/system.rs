//! Process metrics collection
//!
//! Collects process-level metrics like memory and CPU time using sysinfo.
//! A background task refreshes the sample once per step; scrapes only read
//! the last sample, plus the uptime which is derived from the clock.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, Opts};
use std::sync::{Arc, Mutex};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

use super::naming::{MeterKind, prometheus_name};
use super::registry::PrometheusRegistry;
use crate::clock::Clock;
use crate::errors::Result;

pub struct ProcessMetrics {
    clock: Arc<dyn Clock>,
    started_at_nanos: u64,
    pid: Pid,
    system: Mutex<System>,
    uptime_seconds: Gauge,
    resident_memory_bytes: Gauge,
    virtual_memory_bytes: Gauge,
    cpu_seconds: Gauge,
    build_info: GaugeVec,
}

impl ProcessMetrics {
    pub fn new(namespace: Option<&str>, clock: Arc<dyn Clock>) -> Result<Self> {
        let name = |n: &str| prometheus_name(namespace, n, MeterKind::Gauge);

        let uptime_seconds = Gauge::new(name("process.uptime.seconds"), "Process uptime in seconds")?;
        let resident_memory_bytes = Gauge::new(
            name("process.resident.memory.bytes"),
            "Resident memory size in bytes",
        )?;
        let virtual_memory_bytes = Gauge::new(
            name("process.virtual.memory.bytes"),
            "Virtual memory size in bytes",
        )?;
        let cpu_seconds = Gauge::new(
            name("process.cpu.seconds"),
            "Total user and system CPU time spent in seconds",
        )?;
        let build_info = GaugeVec::new(
            Opts::new(name("build.info"), "Build information, value is always 1"),
            &["version"],
        )?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1.0);

        let started_at_nanos = clock.monotonic_nanos();
        let metrics = Self {
            clock,
            started_at_nanos,
            pid: Pid::from_u32(std::process::id()),
            system: Mutex::new(System::new()),
            uptime_seconds,
            resident_memory_bytes,
            virtual_memory_bytes,
            cpu_seconds,
            build_info,
        };
        metrics.refresh();
        Ok(metrics)
    }

    /// Register into the shared registry
    pub fn register(self: &Arc<Self>, registry: &PrometheusRegistry) -> Result<()> {
        registry.register(Box::new(ProcessCollector(self.clone())))
    }

    /// Sample memory and CPU time of the current process
    pub fn refresh(&self) {
        let mut sys = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("System metrics mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        };

        // Refresh only the current process
        sys.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);

        if let Some(process) = sys.process(self.pid) {
            self.resident_memory_bytes.set(process.memory() as f64);
            self.virtual_memory_bytes.set(process.virtual_memory() as f64);

            // accumulated in milliseconds
            self.cpu_seconds
                .set(process.accumulated_cpu_time() as f64 / 1000.0);
        }
    }

    pub fn uptime(&self) -> Duration {
        Duration::from_nanos(
            self.clock
                .monotonic_nanos()
                .saturating_sub(self.started_at_nanos),
        )
    }

    /// Spawn a background task that refreshes the sample every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_updater(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                self.refresh();
            }
        })
    }
}

struct ProcessCollector(Arc<ProcessMetrics>);

impl Collector for ProcessCollector {
    fn desc(&self) -> Vec<&Desc> {
        let m = &self.0;
        let mut descs = Vec::new();
        descs.extend(m.uptime_seconds.desc());
        descs.extend(m.resident_memory_bytes.desc());
        descs.extend(m.virtual_memory_bytes.desc());
        descs.extend(m.cpu_seconds.desc());
        descs.extend(m.build_info.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let m = &self.0;
        m.uptime_seconds.set(m.uptime().as_secs_f64());

        let mut families = Vec::new();
        families.extend(m.uptime_seconds.collect());
        families.extend(m.resident_memory_bytes.collect());
        families.extend(m.virtual_memory_bytes.collect());
        families.extend(m.cpu_seconds.collect());
        families.extend(m.build_info.collect());
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::metrics::encode_text;

    #[test]
    fn test_process_metrics_exposed() {
        let clock = Arc::new(MockClock::new(chrono::Utc::now()));
        let registry = PrometheusRegistry::new();
        let metrics = Arc::new(ProcessMetrics::new(None, clock.clone()).unwrap());
        metrics.register(&registry).unwrap();

        clock.advance(Duration::from_secs(42));
        let output = encode_text(&registry.gather()).unwrap();

        assert!(output.contains("process_uptime_seconds 42"));
        assert!(output.contains("process_resident_memory_bytes"));
        assert!(output.contains("build_info{version=\""));
    }

    #[test]
    fn test_namespace_applies() {
        let clock = Arc::new(MockClock::new(chrono::Utc::now()));
        let registry = PrometheusRegistry::new();
        let metrics = Arc::new(ProcessMetrics::new(Some("app"), clock).unwrap());
        metrics.register(&registry).unwrap();

        let output = encode_text(&registry.gather()).unwrap();
        assert!(output.contains("app_process_uptime_seconds"));
        assert!(output.contains("app_build_info"));
    }
}
