//! Core metrics traits (always compiled, no feature gate).
//!
//! Provides `MeterRecorder` and `NoopRecorder` so that producers can accept
//! `Arc<dyn MeterRecorder>` unconditionally. When the `metrics` feature is
//! disabled, or export is switched off, `NoopRecorder` is injected and every
//! call does nothing.

use std::sync::Arc;

/// Label pairs attached to a measurement, in label-name order
pub type Labels<'a> = &'a [(&'a str, &'a str)];

/// Trait for recording measurements by meter name.
///
/// All methods are no-op by default, allowing partial implementation.
/// Implementations must be thread-safe (Send + Sync) and must never fail
/// the caller: recording problems are logged, not returned.
#[allow(unused_variables)]
pub trait MeterRecorder: Send + Sync {
    /// Add `value` to a counter
    fn increment_counter(&self, name: &str, labels: Labels<'_>, value: f64) {}

    /// Set a gauge to `value`
    fn set_gauge(&self, name: &str, labels: Labels<'_>, value: f64) {}

    /// Record one observation into a histogram
    fn observe_histogram(&self, name: &str, labels: Labels<'_>, value: f64) {}
}

/// Noop recorder for tests and for builds where nothing was wired.
pub struct NoopRecorder;

impl MeterRecorder for NoopRecorder {}

impl NoopRecorder {
    pub fn new() -> Self {
        Self
    }

    pub fn arc() -> Arc<dyn MeterRecorder> {
        Arc::new(Self::new())
    }
}

impl Default for NoopRecorder {
    fn default() -> Self {
        Self::new()
    }
}
