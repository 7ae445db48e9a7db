//! Scrape endpoint
//!
//! Reads the shared registry and renders the Prometheus text format. Holds
//! no state besides the registry handle and the exposition settings, so any
//! number of scrapes may run at once.

use std::collections::HashSet;
use std::sync::Arc;

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};

use super::registry::PrometheusRegistry;
use crate::config::{ExpositionConfig, MetricNameFilterConfig};
use crate::errors::{PromgateError, Result};

/// Endpoint id used for exposure checks
pub const ENDPOINT_ID: &str = "prometheus";

/// Content type of the text exposition format
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Sample-name suffixes a family can emit besides its own name
const SAMPLE_SUFFIXES: [&str; 6] = ["_total", "_bucket", "_count", "_sum", "_created", "_info"];

/// Encode families into the text format
pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(families, &mut buffer)
        .map_err(|e| PromgateError::encoding(e.to_string()))?;
    Ok(String::from_utf8(buffer)?)
}

/// Global metric name filter
#[derive(Debug, Clone, Default)]
pub struct MetricNameFilter {
    must_be_equal_to: Vec<String>,
    must_not_be_equal_to: Vec<String>,
    must_start_with: Vec<String>,
    must_not_start_with: Vec<String>,
}

impl MetricNameFilter {
    pub fn from_config(config: &MetricNameFilterConfig) -> Self {
        Self {
            must_be_equal_to: config.metric_name_must_be_equal_to.clone(),
            must_not_be_equal_to: config.metric_name_must_not_be_equal_to.clone(),
            must_start_with: config.metric_name_must_start_with.clone(),
            must_not_start_with: config.metric_name_must_not_start_with.clone(),
        }
    }

    pub fn matches(&self, family_name: &str) -> bool {
        let equals_any = |list: &[String]| list.iter().any(|n| name_matches(family_name, n));
        let starts_any = |list: &[String]| list.iter().any(|p| family_name.starts_with(p.as_str()));

        (self.must_be_equal_to.is_empty() || equals_any(&self.must_be_equal_to))
            && !equals_any(&self.must_not_be_equal_to)
            && (self.must_start_with.is_empty() || starts_any(&self.must_start_with))
            && !starts_any(&self.must_not_start_with)
    }
}

/// True when `wanted` is the family name or one of its sample names
fn name_matches(family_name: &str, wanted: &str) -> bool {
    if wanted == family_name {
        return true;
    }
    wanted
        .strip_prefix(family_name)
        .is_some_and(|suffix| SAMPLE_SUFFIXES.contains(&suffix))
}

/// Settings applied to every scrape
#[derive(Debug, Clone, Default)]
pub struct ExpositionSettings {
    pub filter: MetricNameFilter,
}

impl ExpositionSettings {
    pub fn from_config(config: &ExpositionConfig) -> Self {
        Self {
            filter: MetricNameFilter::from_config(&config.filter),
        }
    }
}

/// Result of one scrape
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub body: String,
    pub content_type: &'static str,
    pub families: usize,
}

pub struct ScrapeEndpoint {
    registry: Arc<PrometheusRegistry>,
    settings: Arc<ExpositionSettings>,
}

impl ScrapeEndpoint {
    pub fn new(registry: Arc<PrometheusRegistry>, settings: Arc<ExpositionSettings>) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<PrometheusRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &Arc<ExpositionSettings> {
        &self.settings
    }

    /// Render the current registry snapshot.
    ///
    /// With `included_names`, only families whose name or sample name is in
    /// the set are emitted. The global filter always applies.
    pub fn scrape(&self, included_names: Option<&HashSet<String>>) -> Result<ScrapeOutput> {
        let selected: Vec<MetricFamily> = self
            .registry
            .gather()
            .into_iter()
            .filter(|family| {
                let name = family.name();
                self.settings.filter.matches(name)
                    && included_names
                        .is_none_or(|wanted| wanted.iter().any(|w| name_matches(name, w)))
            })
            .collect();

        Ok(ScrapeOutput {
            body: encode_text(&selected)?,
            content_type: TEXT_CONTENT_TYPE,
            families: selected.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{CounterVec, Histogram, HistogramOpts, IntGauge, Opts};

    fn populated_registry() -> Arc<PrometheusRegistry> {
        let registry = Arc::new(PrometheusRegistry::new());

        let requests = CounterVec::new(
            Opts::new("http_requests_total", "HTTP requests"),
            &["method"],
        )
        .unwrap();
        requests.with_label_values(&["GET"]).inc();
        registry.register(Box::new(requests)).unwrap();

        let queue = IntGauge::new("jobs_queue_size", "Queued jobs").unwrap();
        queue.set(5);
        registry.register(Box::new(queue)).unwrap();

        let latency =
            Histogram::with_opts(HistogramOpts::new("http_latency", "Latency")).unwrap();
        latency.observe(0.1);
        registry.register(Box::new(latency)).unwrap();

        registry
    }

    fn endpoint(filter: MetricNameFilterConfig) -> ScrapeEndpoint {
        let settings = ExpositionSettings::from_config(&ExpositionConfig { filter });
        ScrapeEndpoint::new(populated_registry(), Arc::new(settings))
    }

    #[test]
    fn test_scrape_all() {
        let output = endpoint(MetricNameFilterConfig::default()).scrape(None).unwrap();
        assert_eq!(output.content_type, TEXT_CONTENT_TYPE);
        assert_eq!(output.families, 3);
        assert!(output.body.contains("http_requests_total{method=\"GET\"} 1"));
        assert!(output.body.contains("jobs_queue_size 5"));
        assert!(output.body.contains("http_latency_count 1"));
    }

    #[test]
    fn test_included_names_match_sample_names() {
        let endpoint = endpoint(MetricNameFilterConfig::default());
        let wanted: HashSet<String> = ["http_latency_bucket".to_string()].into();
        let output = endpoint.scrape(Some(&wanted)).unwrap();

        assert_eq!(output.families, 1);
        assert!(output.body.contains("http_latency_bucket"));
        assert!(!output.body.contains("jobs_queue_size"));
    }

    #[test]
    fn test_empty_included_names_yield_nothing() {
        let endpoint = endpoint(MetricNameFilterConfig::default());
        let output = endpoint.scrape(Some(&HashSet::new())).unwrap();
        assert_eq!(output.families, 0);
        assert!(output.body.is_empty());
    }

    #[test]
    fn test_global_filter() {
        let endpoint = endpoint(MetricNameFilterConfig {
            metric_name_must_start_with: vec!["http_".to_string()],
            metric_name_must_not_be_equal_to: vec!["http_latency".to_string()],
            ..MetricNameFilterConfig::default()
        });
        let output = endpoint.scrape(None).unwrap();
        assert_eq!(output.families, 1);
        assert!(output.body.contains("http_requests_total"));
    }

    #[test]
    fn test_filter_matching_rules() {
        let filter = MetricNameFilter::from_config(&MetricNameFilterConfig {
            metric_name_must_be_equal_to: vec!["jobs".to_string()],
            ..MetricNameFilterConfig::default()
        });
        assert!(filter.matches("jobs"));
        assert!(!filter.matches("jobs_queue"));
        assert!(name_matches("jobs", "jobs_total"));
        assert!(!name_matches("jobs", "jobs_other"));
    }
}
