//! Prometheus scrape endpoint
//!
//! Exposes the shared registry in Prometheus text format at the configured
//! path (default `/actuator/prometheus`).

use actix_web::{HttpRequest, HttpResponse, Responder};
use std::collections::HashSet;

#[cfg(feature = "metrics")]
use actix_web::web;
#[cfg(feature = "metrics")]
use std::sync::Arc;
#[cfg(feature = "metrics")]
use tracing::{error, trace};

#[cfg(feature = "metrics")]
use crate::metrics::ScrapeEndpoint;

/// Metrics service handler
pub struct MetricsService;

impl MetricsService {
    /// Handle a scrape request
    ///
    /// `?name[]=a&name[]=b` (or `?name=a`) restricts the output to those
    /// metric names.
    #[cfg(feature = "metrics")]
    pub async fn scrape(req: HttpRequest, endpoint: web::Data<Arc<ScrapeEndpoint>>) -> impl Responder {
        let included = included_names(req.query_string());
        trace!("Received scrape request, filter: {:?}", included);

        match endpoint.scrape(included.as_ref()) {
            Ok(output) => HttpResponse::Ok()
                .content_type(output.content_type)
                .body(output.body),
            Err(e) => {
                error!("Failed to render metrics: {}", e);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "code": e.code(),
                    "error": e.error_type(),
                    "message": e.message(),
                }))
            }
        }
    }

    /// Answer for the scrape path when no endpoint was wired
    pub async fn unavailable(_req: HttpRequest) -> impl Responder {
        let reason = if cfg!(feature = "metrics") {
            "Prometheus scrape endpoint is not available"
        } else {
            "Metrics not enabled. Rebuild with --features metrics"
        };
        HttpResponse::NotFound()
            .content_type("text/plain")
            .body(reason)
    }
}

/// Collect `name[]` / `name` query parameters; `None` when absent
pub fn included_names(query: &str) -> Option<HashSet<String>> {
    let names: HashSet<String> = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "name[]" || key == "name")
        .map(|(_, value)| value.into_owned())
        .collect();
    if names.is_empty() { None } else { Some(names) }
}

/// Route for the scrape path, served by the endpoint or by a 404 when the
/// endpoint was not wired.
#[cfg(feature = "metrics")]
pub fn scrape_routes(path: &str, endpoint: Option<Arc<ScrapeEndpoint>>) -> actix_web::Resource {
    let resource = web::resource(path);
    match endpoint {
        Some(endpoint) => resource
            .app_data(web::Data::new(endpoint))
            .route(web::get().to(MetricsService::scrape))
            .route(web::head().to(MetricsService::scrape)),
        None => resource.route(web::get().to(MetricsService::unavailable)),
    }
}

#[cfg(not(feature = "metrics"))]
pub fn scrape_routes(path: &str) -> actix_web::Resource {
    actix_web::web::resource(path).route(actix_web::web::get().to(MetricsService::unavailable))
}
