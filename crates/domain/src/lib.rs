//! Ferrous RPZ Domain Layer
pub mod address;
pub mod association;
pub mod batch;
pub mod config;
pub mod errors;
pub mod heuristic;
pub mod resolution;
pub mod telemetry;
pub mod zone_entry;

pub use address::RpzAddress;
pub use association::Association;
pub use batch::{Batch, BatchState, UpdateRcode};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use heuristic::{select_best, Heuristic, TrendingHeuristic};
pub use resolution::Resolution;
pub use telemetry::{ResolutionObservation, TelemetryEvent};
pub use zone_entry::{TxtMetadata, ZoneEntry};
