use std::future::IntoFuture;

use tokio::signal::unix::{self, SignalKind};
use tokio_util::{
    sync::CancellationToken,
    task::TaskTracker,
};

use nexus_server::api::{self, AppState};
use nexus_server::tracing::{self, prelude::*};
use nexus_server::{growth, Config, StatsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::init();

    let config = Config::from_env();
    let store = StatsStore::open(&config.db_path).await?;
    store.ensure_initialized().await?;

    let running = CancellationToken::new();
    let tracker = TaskTracker::new();
    tracker.spawn(growth::task(running.clone(), store.clone()));
    tracker.close();

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!("Nexus Hub running at http://{}", listener.local_addr()?);

    let app = api::routes(AppState::new(config, store));
    let shutdown = running.clone();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .into_future(),
    );
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt())?;
    let mut sigterm = unix::signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }

    trace!("Shutting down.");
    running.cancel();

    tracker.wait().await;
    server.await??;
    info!("Exiting.");
    Ok(())
}
