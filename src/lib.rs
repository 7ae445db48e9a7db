//! Promgate - conditional Prometheus metrics export
//!
//! Decides once at startup whether a metric registry, a configuration
//! adapter and an HTTP scrape endpoint should exist, builds the missing ones
//! as shared singletons and serves the scrape route.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **metrics**: Prometheus exposition library (default). Without it the
//!   wiring is skipped and producers get a no-op recorder.
//!
//! # Architecture
//! - `context`: Type-keyed singleton store
//! - `wiring`: The conditional construction of exporter beans
//! - `metrics`: Registry, config adapter, meter registry, scrape endpoint
//! - `metrics_core`: Recorder facade, always compiled
//! - `api`: HTTP services
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod errors;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod metrics_core;
pub mod runtime;
pub mod system;
pub mod utils;
pub mod wiring;
