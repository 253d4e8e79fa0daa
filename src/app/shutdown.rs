//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Stops the progress logger and the rate limiter refill task.
///
/// `cancel` is the logger's token, not the crawl's.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
    rate_limiter_shutdown: Option<CancellationToken>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        if let Err(e) = logging_task.await {
            log::debug!("Progress logger ended abnormally: {}", e);
        }
    }

    if let Some(shutdown) = rate_limiter_shutdown {
        shutdown.cancel();
    }
}
