//! Collector and dashboard entry points.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info};
use vitals_collector::{run_server, CollectorConfig, SnapshotStore};
use vitals_dashboard::{render, DashboardConfig, DashboardView, HttpSnapshotSource, Poller};

use crate::error::AppResult;

/// Clears the terminal and homes the cursor before each frame.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Resolves on ctrl-c.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Run the collector until `shutdown` resolves.
pub async fn run_collector<F>(config: CollectorConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(port = config.port, "Starting collector");
    run_server(SnapshotStore::new(), config, shutdown).await?;
    Ok(())
}

/// Poll a collector and redraw the view on stdout until `shutdown` resolves.
///
/// The poller is torn down before returning.
pub async fn run_dashboard<F>(config: DashboardConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send,
{
    let source = Arc::new(HttpSnapshotSource::new(&config)?);
    let view = Arc::new(RwLock::new(DashboardView::new(
        config.max_log_entries,
        config.discard_stale_responses,
    )));

    info!(
        url = %source.url(),
        interval_ms = config.poll_interval_ms,
        "Starting dashboard"
    );
    let handle = Poller::new(source, view.clone(), config.poll_interval()).spawn();

    let mut redraw = tokio::time::interval(config.poll_interval());
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            () = &mut shutdown => break Ok(()),
            _ = redraw.tick() => {
                let frame = render(&view.read());
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = write!(stdout, "{CLEAR_SCREEN}{frame}").and_then(|()| stdout.flush()) {
                    break Err(e.into());
                }
            }
        }
    };

    handle.shutdown().await;
    result
}
