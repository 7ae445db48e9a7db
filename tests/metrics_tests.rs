//! Metrics module tests
//!
//! Tests for the meter registry, process metrics and the recorder trait.
//! These tests require the `metrics` feature to be enabled:
//!   cargo test --features metrics --test metrics_tests

#![cfg(feature = "metrics")]

use std::sync::Arc;
use std::time::Duration;

use promgate::clock::{Clock, MockClock};
use promgate::config::PrometheusProperties;
use promgate::errors::PromgateError;
use promgate::metrics::{
    DefaultPrometheusConfig, PrometheusMeterRegistry, PrometheusRegistry, ProcessMetrics,
    PropertiesConfigAdapter, encode_text,
};
use promgate::metrics_core::{MeterRecorder, NoopRecorder};

fn setup() -> (Arc<PrometheusRegistry>, Arc<MockClock>, PrometheusMeterRegistry) {
    let registry = Arc::new(PrometheusRegistry::new());
    let clock = Arc::new(MockClock::new(chrono::Utc::now()));
    let meters = PrometheusMeterRegistry::new(
        Arc::new(DefaultPrometheusConfig),
        registry.clone(),
        clock.clone(),
    )
    .expect("Failed to create meter registry");
    (registry, clock, meters)
}

fn render(registry: &PrometheusRegistry) -> String {
    encode_text(&registry.gather()).expect("Failed to encode")
}

// =============================================================================
// NoopRecorder Tests
// =============================================================================

#[test]
fn test_noop_recorder_accepts_everything() {
    let noop = NoopRecorder::new();
    noop.increment_counter("requests", &[("method", "GET")], 1.0);
    noop.set_gauge("queue", &[], 42.0);
    noop.observe_histogram("latency", &[("route", "/")], 0.25);
}

#[test]
fn test_noop_recorder_arc() {
    let recorder: Arc<dyn MeterRecorder> = NoopRecorder::arc();
    recorder.increment_counter("requests", &[], 1.0);
}

// =============================================================================
// Meter registry Tests
// =============================================================================

#[test]
fn test_same_name_returns_same_instrument() {
    let (registry, _clock, meters) = setup();

    let first = meters.counter("cache.hits", "Cache hits", &["layer"]).unwrap();
    let second = meters.counter("cache.hits", "Cache hits", &["layer"]).unwrap();
    first.with_label_values(&["l1"]).inc();
    second.with_label_values(&["l1"]).inc();

    assert_eq!(meters.meter_count(), 1);
    assert!(render(&registry).contains("cache_hits_total{layer=\"l1\"} 2"));
}

#[test]
fn test_kind_conflict_is_rejected() {
    let (_registry, _clock, meters) = setup();

    meters.histogram("db.query", "Query time", &[]).unwrap();
    let err = meters.gauge("db.query", "Query time", &[]).unwrap_err();
    assert!(matches!(err, PromgateError::MeterConflict(_)));
}

#[test]
fn test_recorder_counter_gauge_histogram() {
    let (registry, _clock, meters) = setup();
    let recorder: &dyn MeterRecorder = &meters;

    recorder.increment_counter("jobs.done", &[("queue", "mail")], 2.0);
    recorder.increment_counter("jobs.done", &[("queue", "mail")], -5.0);
    recorder.set_gauge("jobs.pending", &[("queue", "mail")], 7.0);
    recorder.observe_histogram("jobs.duration", &[], 0.2);

    let output = render(&registry);
    assert!(output.contains("jobs_done_total{queue=\"mail\"} 2"));
    assert!(output.contains("jobs_pending{queue=\"mail\"} 7"));
    assert!(output.contains("jobs_duration_count 1"));
}

#[test]
fn test_recorder_label_mismatch_is_logged_not_raised() {
    let (registry, _clock, meters) = setup();

    meters.set_gauge("workers", &[("pool", "a")], 1.0);
    meters.set_gauge("workers", &[("pool", "a"), ("zone", "eu")], 2.0);

    assert!(render(&registry).contains("workers{pool=\"a\"} 1"));
}

#[test]
fn test_timer_measures_with_mock_clock() {
    let (registry, clock, meters) = setup();
    let timer = meters.timer("request.latency", "Request latency", &["route"]).unwrap();

    let value = timer.record(&["/users"], || {
        clock.advance(Duration::from_millis(250));
        42
    });
    assert_eq!(value, 42);

    let output = render(&registry);
    assert!(output.contains("request_latency_seconds_count{route=\"/users\"} 1"));
    assert!(output.contains("request_latency_seconds_sum{route=\"/users\"} 0.25"));
}

#[test]
fn test_namespace_prefix_applies() {
    let registry = Arc::new(PrometheusRegistry::new());
    let properties = PrometheusProperties {
        prefix: Some("billing".to_string()),
        ..PrometheusProperties::default()
    };
    let clock: Arc<dyn Clock> = Arc::new(MockClock::new(chrono::Utc::now()));
    let meters = PrometheusMeterRegistry::new(
        Arc::new(PropertiesConfigAdapter::new(properties)),
        registry.clone(),
        clock,
    )
    .unwrap();

    meters.increment_counter("invoices", &[], 1.0);
    assert!(render(&registry).contains("billing_invoices_total 1"));
}

// =============================================================================
// Process metrics Tests
// =============================================================================

#[test]
fn test_process_metrics_exported() {
    let registry = PrometheusRegistry::new();
    let clock = Arc::new(MockClock::new(chrono::Utc::now()));
    let process = Arc::new(ProcessMetrics::new(None, clock.clone()).unwrap());
    process.register(&registry).unwrap();

    clock.advance(Duration::from_secs(90));
    let output = render(&registry);

    assert!(output.contains("process_uptime_seconds 90"));
    assert!(output.contains("process_resident_memory_bytes"));
    assert!(output.contains("process_cpu_seconds"));
    assert!(output.contains(&format!(
        "build_info{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    )));
}

#[test]
fn test_process_metrics_double_registration_fails() {
    let registry = PrometheusRegistry::new();
    let clock = Arc::new(MockClock::new(chrono::Utc::now()));
    let process = Arc::new(ProcessMetrics::new(None, clock).unwrap());

    process.register(&registry).unwrap();
    let err = process.register(&registry).unwrap_err();
    assert!(matches!(err, PromgateError::Registration(_)));
}

#[tokio::test]
async fn test_process_updater_can_be_stopped() {
    let clock = Arc::new(MockClock::new(chrono::Utc::now()));
    let process = Arc::new(ProcessMetrics::new(Some("svc"), clock).unwrap());

    let handle = process.clone().spawn_updater(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(30)).await;
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
}
