use async_trait::async_trait;
use ferrous_rpz_domain::{DomainError, TelemetryEvent};

/// Port the telemetry ingress adapters deliver into. Both the JSON/UDP
/// listener and a streamed dnstap decoder produce the same wire-form event;
/// validation, canonicalization and the invalid-event counter live behind
/// the sink.
///
/// An `Err` from `submit` is an invariant violation: the engine state is
/// undefined and the caller must shut down. Malformed events are swallowed
/// and counted, never returned as errors.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn submit(&self, event: TelemetryEvent) -> Result<(), DomainError>;
}
