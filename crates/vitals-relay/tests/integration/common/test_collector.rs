//! Loopback collector for integration tests.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use vitals_collector::{serve, CollectorConfig, CollectorResult, SnapshotStore};

/// A collector bound to an ephemeral port on 127.0.0.1.
pub struct TestCollector {
    addr: SocketAddr,
    store: SnapshotStore,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<CollectorResult<()>>,
}

impl TestCollector {
    /// Start a collector with an empty store.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = SnapshotStore::new();
        let config = CollectorConfig {
            port: addr.port(),
            ..Default::default()
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_store = store.clone();
        let task = tokio::spawn(async move {
            serve(listener, server_store, &config, async {
                let _ = shutdown_rx.await;
            })
            .await
        });

        Self {
            addr,
            store,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of the telemetry endpoint.
    pub fn telemetry_url(&self) -> String {
        format!("{}/api/telemetry", self.base_url())
    }

    /// The store backing the server.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.await.unwrap().unwrap();
    }
}
