//! HTTP serving of the scrape route

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::services::scrape_routes;
use crate::config::StaticConfig;
use crate::context::BeanContext;
use crate::runtime::lifetime;

/// Upper bound for actix workers
const MAX_WORKERS: usize = 32;

/// Wire the exporter into `context`, serve until Ctrl+C, then stop the
/// background refresh tasks. Expects logging to be installed already.
pub async fn run_server(config: Arc<StaticConfig>, context: Arc<BeanContext>) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(&config, context)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let scrape_path = startup.scrape_path.clone();
    if let Some(reason) = startup.report.skipped {
        warn!("Metrics export skipped ({:?}), {} answers 404", reason, scrape_path);
    } else {
        info!(
            "Metrics export ready, {} bean(s) created at startup",
            startup.report.created_count()
        );
    }
    #[cfg(feature = "metrics")]
    let endpoint = startup.endpoint.clone();

    let workers = config.server.workers.clamp(1, MAX_WORKERS);
    warn!("Using {} worker(s) for the server", workers);

    let server = HttpServer::new(move || {
        #[cfg(feature = "metrics")]
        let scrape = scrape_routes(&scrape_path, endpoint.clone());
        #[cfg(not(feature = "metrics"))]
        let scrape = scrape_routes(&scrape_path);

        App::new()
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(scrape)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(workers);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            handle.stop(true).await;
            warn!("Graceful shutdown: server stopped");
        }
    }

    lifetime::shutdown::stop_background_tasks(startup.background_tasks);
    Ok(())
}
