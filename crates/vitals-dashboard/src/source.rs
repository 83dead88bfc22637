//! Snapshot sources.
//!
//! The poller fetches through the `SnapshotSource` trait so it can run
//! against the collector over HTTP or against a scripted mock in tests.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use tracing::trace;
use vitals_core::Published;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Fetches the collector's published snapshot.
pub trait SnapshotSource: Send + Sync {
    /// Fetch once. Non-2xx responses and undecodable bodies are errors.
    fn fetch(&self) -> BoxFuture<'_, DashboardResult<Published>>;
}

/// HTTP source backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    /// Create a source for `config.url`.
    pub fn new(config: &DashboardConfig) -> DashboardResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            DashboardError::HttpClient(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch(&self) -> BoxFuture<'_, DashboardResult<Published>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| DashboardError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(DashboardError::Status(status.as_u16()));
            }

            let published = response
                .json::<Published>()
                .await
                .map_err(|e| DashboardError::Decode(e.to_string()))?;
            trace!(waiting = published.is_waiting(), "Fetched snapshot");
            Ok(published)
        })
    }
}

/// Scripted response for `MockSnapshotSource`.
#[derive(Debug)]
struct Scripted {
    delay: Duration,
    result: DashboardResult<Published>,
}

/// Mock source replaying scripted responses in order.
///
/// Once the script runs out every fetch fails with a transport error.
#[derive(Debug, Default)]
pub struct MockSnapshotSource {
    script: Mutex<VecDeque<Scripted>>,
    fetches: AtomicUsize,
}

impl MockSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate response.
    pub fn push(&self, result: DashboardResult<Published>) {
        self.push_delayed(Duration::ZERO, result);
    }

    /// Queue a response that resolves after `delay`.
    pub fn push_delayed(&self, delay: Duration, result: DashboardResult<Published>) {
        self.script.lock().push_back(Scripted { delay, result });
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for MockSnapshotSource {
    fn fetch(&self) -> BoxFuture<'_, DashboardResult<Published>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        Box::pin(async move {
            match next {
                Some(scripted) => {
                    if !scripted.delay.is_zero() {
                        tokio::time::sleep(scripted.delay).await;
                    }
                    scripted.result
                }
                None => Err(DashboardError::Transport("script exhausted".to_string())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_in_order() {
        let mock = MockSnapshotSource::new();
        mock.push(Ok(Published::waiting()));
        mock.push(Err(DashboardError::Status(503)));

        assert!(mock.fetch().await.unwrap().is_waiting());
        assert!(matches!(mock.fetch().await, Err(DashboardError::Status(503))));
        assert!(matches!(mock.fetch().await, Err(DashboardError::Transport(_))));
        assert_eq!(mock.fetch_count(), 3);
    }

    #[test]
    fn test_http_source_uses_configured_url() {
        let config = DashboardConfig {
            url: "http://127.0.0.1:9/api/telemetry".to_string(),
            request_timeout_ms: Some(500),
            ..Default::default()
        };
        let source = HttpSnapshotSource::new(&config).unwrap();
        assert_eq!(source.url(), "http://127.0.0.1:9/api/telemetry");
    }
}
