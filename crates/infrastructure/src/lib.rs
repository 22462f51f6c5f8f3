//! Ferrous RPZ Infrastructure Layer
//!
//! Adapters at the system's edges: telemetry ingress, the RFC 2136 update
//! client, the startup zone-file read and the diagnostic console.
pub mod console;
pub mod telemetry;
pub mod update;
pub mod zone;

pub use console::ConsoleServer;
pub use telemetry::JsonUdpListener;
pub use update::Rfc2136UpdateClient;
pub use zone::FileZoneSource;
