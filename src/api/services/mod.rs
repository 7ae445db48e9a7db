pub mod metrics;

pub use metrics::{MetricsService, included_names, scrape_routes};
