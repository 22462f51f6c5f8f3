pub mod association_store;
pub mod engine;
pub mod eviction_queue;
pub mod refresh_batcher;
pub mod ring_log;
pub mod zone_view;

pub use association_store::{AssociationStore, EvictionOutcome};
pub use engine::RpzEngine;
pub use eviction_queue::EvictionQueue;
pub use refresh_batcher::RefreshBatcher;
pub use ring_log::RingLog;
pub use zone_view::ZoneView;
