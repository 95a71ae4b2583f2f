//! Background fetch and auto-refresh system
//!
//! Gateway calls run in spawned tokio tasks and report back over an mpsc
//! channel so the UI loop stays responsive. A ticker task emits an
//! auto-refresh message at a fixed interval. Results are only ever committed
//! by the receiver.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::data::{GatewayError, Location, WeatherGateway, WeatherReport};

/// Channel capacity for worker messages
const CHANNEL_CAPACITY: usize = 32;

/// A single weather fetch, tagged so stale results can be recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Location the fetch was issued for
    pub location: Location,
    /// Monotonically increasing request number
    pub generation: u64,
}

/// Messages sent from background tasks to the main loop
#[derive(Debug)]
pub enum RefreshMessage {
    /// A fetch finished, successfully or not
    Fetched {
        request: FetchRequest,
        result: Result<WeatherReport, GatewayError>,
    },
    /// The auto-refresh interval elapsed
    AutoRefreshTick,
}

/// Configuration for the auto-refresh ticker
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between auto-refresh ticks
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600), // 10 minutes
            enabled: true,
        }
    }
}

/// Handle for dispatching fetches and receiving their results
pub struct RefreshHandle {
    /// Channel for receiving worker messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    sender: mpsc::Sender<RefreshMessage>,
    gateway: Arc<dyn WeatherGateway>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Creates a RefreshHandle and spawns the auto-refresh ticker
    ///
    /// # Arguments
    /// * `config` - Ticker configuration
    /// * `gateway` - Weather source used by [`RefreshHandle::dispatch`]
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: RefreshConfig, gateway: Arc<dyn WeatherGateway>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled {
            let tx = msg_tx.clone();
            let period = config.interval;

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                // Skip the first tick (immediate)
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            tracing::debug!("auto-refresh tick");
                            if tx.send(RefreshMessage::AutoRefreshTick).await.is_err() {
                                break;
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            receiver: msg_rx,
            sender: msg_tx,
            gateway,
            shutdown_tx,
        }
    }

    /// Starts a fetch in the background
    ///
    /// The result arrives later as [`RefreshMessage::Fetched`] carrying the
    /// same request. Superseded fetches are not cancelled.
    pub fn dispatch(&self, request: FetchRequest) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.sender.clone();

        tracing::info!(
            location = %request.location.query,
            generation = request.generation,
            "fetching weather"
        );

        tokio::spawn(async move {
            let result = gateway.fetch(&request.location.query).await;
            if tx
                .send(RefreshMessage::Fetched { request, result })
                .await
                .is_err()
            {
                tracing::debug!("receiver dropped before fetch completed");
            }
        });
    }

    /// Waits for the next worker message
    pub async fn recv(&mut self) -> Option<RefreshMessage> {
        self.receiver.recv().await
    }

    /// Shuts down the auto-refresh ticker
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Checks for pending worker messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
