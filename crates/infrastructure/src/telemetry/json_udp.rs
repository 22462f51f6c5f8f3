use ferrous_rpz_application::ports::TelemetrySink;
use ferrous_rpz_domain::{DomainError, TelemetryEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// JSON-over-UDP telemetry ingress: one datagram per observed resolution,
/// `{"address": <literal>, "chain": [<terminal>, ..., <query>]}`.
///
/// Datagrams that do not parse are dropped and counted locally; validation
/// of the payload itself happens behind the sink. A fatal error from the
/// sink stops the listener.
pub struct JsonUdpListener {
    bind_address: String,
    sink: Arc<dyn TelemetrySink>,
    undecodable: AtomicU64,
    shutdown: CancellationToken,
}

impl JsonUdpListener {
    pub fn new(bind_address: String, sink: Arc<dyn TelemetrySink>) -> Self {
        Self {
            bind_address,
            sink,
            undecodable: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn undecodable_datagrams(&self) -> u64 {
        self.undecodable.load(Ordering::Relaxed)
    }

    pub async fn run(self: Arc<Self>) -> Result<(), DomainError> {
        let socket = UdpSocket::bind(&self.bind_address).await.map_err(|e| {
            DomainError::IoError(format!("telemetry bind {}: {}", self.bind_address, e))
        })?;
        info!(bind = %self.bind_address, "Telemetry listener started");

        let mut buf = vec![0u8; 8192];
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Telemetry listener: shutting down");
                    return Ok(());
                }
                received = socket.recv_from(&mut buf) => {
                    let (len, peer) = match received {
                        Ok(ok) => ok,
                        Err(e) => {
                            debug!(error = %e, "Telemetry receive failed");
                            continue;
                        }
                    };
                    let event: TelemetryEvent = match serde_json::from_slice(&buf[..len]) {
                        Ok(event) => event,
                        Err(e) => {
                            self.undecodable.fetch_add(1, Ordering::Relaxed);
                            debug!(peer = %peer, error = %e, "Undecodable telemetry datagram");
                            continue;
                        }
                    };
                    if let Err(e) = self.sink.submit(event).await {
                        error!(error = %e, "Telemetry sink failed fatally");
                        return Err(e);
                    }
                }
            }
        }
    }
}
