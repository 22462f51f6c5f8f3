//! Line-oriented diagnostic console.
//!
//! Every response line is prefixed with a status code and a space:
//! `200` final/ok, `210` report header, `212` data line, `400` bad command,
//! `500` not found or internal error. Connections are served one at a time;
//! each command snapshots the engine, trading throughput for consistency.
//!
//! Commands: `a2z`, `addr <address>`, `zone <address>`, `qd`,
//! `queue <head|tail> <n>`, `evictions <n>`, `refreshes <n>`, `help`,
//! `quit`.

use chrono::DateTime;
use ferrous_rpz_application::ports::{IntrospectionPort, QueueEnd};
use ferrous_rpz_domain::DomainError;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ConsoleServer {
    bind_address: String,
    port: Arc<dyn IntrospectionPort>,
    shutdown: CancellationToken,
}

impl ConsoleServer {
    pub fn new(bind_address: String, port: Arc<dyn IntrospectionPort>) -> Self {
        Self {
            bind_address,
            port,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(self: Arc<Self>) -> Result<(), DomainError> {
        let listener = TcpListener::bind(&self.bind_address).await.map_err(|e| {
            DomainError::IoError(format!("console bind {}: {}", self.bind_address, e))
        })?;
        info!(bind = %self.bind_address, "Diagnostic console started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Diagnostic console: shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!(peer = %peer, "Console client connected");
                            if let Err(e) = self.serve_client(stream).await {
                                debug!(peer = %peer, error = %e, "Console client error");
                            }
                        }
                        Err(e) => debug!(error = %e, "Console accept failed"),
                    }
                }
            }
        }
    }

    async fn serve_client(&self, stream: TcpStream) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                line = lines.next_line() => {
                    let Some(line) = line? else { return Ok(()) };
                    let command = line.trim();
                    if command.is_empty() {
                        continue;
                    }
                    if command.eq_ignore_ascii_case("quit") {
                        writer.write_all(b"200 bye\n").await?;
                        return Ok(());
                    }
                    for response in self.dispatch(command).await {
                        writer.write_all(response.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    writer.flush().await?;
                }
            }
        }
    }

    pub async fn dispatch(&self, command: &str) -> Vec<String> {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        match tokens.as_slice() {
            ["a2z"] => self.cross_check().await,
            ["addr", address] => self.address_details(address).await,
            ["zone", address] => self.zone_entry(address).await,
            ["qd"] => self.queue_depths().await,
            ["queue", end, n] => self.queue_slice(end, n).await,
            ["evictions", n] => self.evictions(n).await,
            ["refreshes", n] => self.refreshes(n).await,
            ["help"] => vec![
                "212 a2z | addr <address> | zone <address> | qd".to_string(),
                "212 queue <head|tail> <n> | evictions <n> | refreshes <n> | quit".to_string(),
                "200 ok".to_string(),
            ],
            _ => vec![format!("400 unrecognized command '{}'", command)],
        }
    }

    async fn cross_check(&self) -> Vec<String> {
        let report = self.port.associations_cross_check().await;
        let mut out = vec![format!(
            "210 associations={} zone_entries={} discrepancies={}",
            report.associations,
            report.zone_entries,
            report.discrepancies()
        )];
        for address in &report.missing_in_zone {
            out.push(format!("212 missing-in-zone {}", address));
        }
        for address in &report.missing_in_store {
            out.push(format!("212 missing-in-store {}", address));
        }
        for divergence in &report.divergent {
            out.push(format!(
                "212 divergent {} store={} zone={}",
                divergence.address,
                divergence.store_terminal.as_deref().unwrap_or("-"),
                divergence.zone_terminal.as_deref().unwrap_or("-"),
            ));
        }
        out.push("200 ok".to_string());
        out
    }

    async fn address_details(&self, address: &str) -> Vec<String> {
        match self.port.address_details(address).await {
            Ok(details) => {
                let mut out = vec![format!(
                    "210 {} best={} enqueued={}",
                    details.address,
                    details.best_terminal.as_deref().unwrap_or("-"),
                    details.enqueued
                )];
                for r in &details.resolutions {
                    out.push(format!(
                        "212 {} score={:.4} queries={} first={} last={} trend={:.2}{}",
                        r.terminal,
                        r.score,
                        r.query_count,
                        format_time(r.first_seen),
                        format_time(r.last_seen),
                        r.trend,
                        if r.reloaded { " reloaded" } else { "" },
                    ));
                }
                out.push("200 ok".to_string());
                out
            }
            Err(e) => vec![not_found(e)],
        }
    }

    async fn zone_entry(&self, address: &str) -> Vec<String> {
        match self.port.zone_entry(address).await {
            Ok(entry) => {
                let metadata = entry
                    .metadata
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                vec![format!(
                    "200 {} PTR {} TXT {}",
                    entry.reverse_name(),
                    entry.terminal,
                    metadata
                )]
            }
            Err(e) => vec![not_found(e)],
        }
    }

    async fn queue_depths(&self) -> Vec<String> {
        let depths = self.port.queue_depths().await;
        vec![format!(
            "200 associations={} resolutions={} cache_size={} queue={} batch_pending={} batch_writing={} invalid_telemetry={}",
            depths.associations,
            depths.resolutions,
            depths.cache_size,
            depths.eviction_queue,
            depths.batch_pending,
            depths.batch_writing,
            depths.invalid_telemetry,
        )]
    }

    async fn queue_slice(&self, end: &str, n: &str) -> Vec<String> {
        let Ok(end) = end.parse::<QueueEnd>() else {
            return vec!["400 expected 'head' or 'tail'".to_string()];
        };
        let Ok(n) = n.parse::<usize>() else {
            return vec!["400 expected a count".to_string()];
        };
        let mut out: Vec<String> = self
            .port
            .queue_slice(end, n)
            .await
            .into_iter()
            .map(|address| format!("212 {}", address))
            .collect();
        out.push("200 ok".to_string());
        out
    }

    async fn evictions(&self, n: &str) -> Vec<String> {
        let Ok(n) = n.parse::<usize>() else {
            return vec!["400 expected a count".to_string()];
        };
        let mut out = Vec::new();
        for event in self.port.recent_evictions(n).await {
            out.push(format!(
                "212 {} overage={} pool={}/{} selected={} recycled={} deleted={} removed={}",
                format_time(event.at),
                event.overage,
                event.actual_pool,
                event.target_pool,
                event.selected,
                event.recycled,
                event.deleted,
                event.removed.len(),
            ));
        }
        out.push("200 ok".to_string());
        out
    }

    async fn refreshes(&self, n: &str) -> Vec<String> {
        let Ok(n) = n.parse::<usize>() else {
            return vec!["400 expected a count".to_string()];
        };
        let mut out = Vec::new();
        for batch in self.port.recent_refreshes(n).await {
            let disposition = match (&batch.rcode, &batch.transport_error) {
                (_, Some(error)) => format!("transport-error '{}'", error),
                (Some(rcode), None) => rcode.to_string(),
                (None, None) => "-".to_string(),
            };
            out.push(format!(
                "212 {} addresses={} adds={} accumulated={:.1}s wrote={:.3}s wire={}/{} {}",
                format_time(batch.created_at()),
                batch.len(),
                batch.add_calls(),
                batch.elapsed_accumulating,
                batch.elapsed_processing,
                batch.wire_request_bytes,
                batch.wire_response_bytes,
                disposition,
            ));
        }
        out.push("200 ok".to_string());
        out
    }
}

fn not_found(error: DomainError) -> String {
    match error {
        DomainError::NotFound(what) => format!("500 not found: {}", what),
        _ => "500 internal error".to_string(),
    }
}

fn format_time(seconds: f64) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| format!("{:.0}", seconds))
}
