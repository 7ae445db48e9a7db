use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Wait for the Ctrl+C signal
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 停止后台任务
pub fn stop_background_tasks(background_tasks: Vec<JoinHandle<()>>) {
    let count = background_tasks.len();
    for task in background_tasks {
        task.abort();
    }
    if count > 0 {
        info!("Stopped {} background task(s)", count);
    }
}
