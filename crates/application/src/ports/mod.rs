mod dns_update;
mod introspection;
mod telemetry_sink;
mod zone_refresh;
mod zone_source;

pub use dns_update::{DnsUpdatePort, PtrUpdate, UpdateRequest, UpdateResponse};
pub use introspection::{
    AddressDetails, CrossCheckReport, Divergence, EvictionEvent, IntrospectionPort, QueueDepths,
    QueueEnd, RemovedResolution, ResolutionDetails,
};
pub use telemetry_sink::TelemetrySink;
pub use zone_refresh::{RefreshCycleOutcome, ZoneRefreshPort};
pub use zone_source::{ZoneSnapshot, ZoneSourcePort};

// Re-export for convenience
pub use ferrous_rpz_domain::ResolutionObservation;
