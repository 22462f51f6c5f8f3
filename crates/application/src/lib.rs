//! Ferrous RPZ Application Layer
//!
//! Ports (the seams toward telemetry ingress, the dynamic-update wire and
//! the diagnostic console) and the services behind them: the association
//! store with its eviction queue, the refresh batcher and the zone view,
//! tied together by the engine facade.
pub mod ports;
pub mod services;

pub use services::engine::RpzEngine;
