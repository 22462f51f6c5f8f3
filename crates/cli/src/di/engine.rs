use ferrous_rpz_application::ports::ZoneSourcePort;
use ferrous_rpz_application::RpzEngine;
use ferrous_rpz_domain::Config;
use ferrous_rpz_infrastructure::{FileZoneSource, Rfc2136UpdateClient};
use std::sync::Arc;

/// Wire the engine to its production collaborators.
pub fn build_engine(config: &Config) -> Arc<RpzEngine> {
    let update_client = Arc::new(Rfc2136UpdateClient::new(
        config.zone.update_target.clone(),
        config.batch.update_timeout,
    ));
    Arc::new(RpzEngine::new(config, update_client))
}

pub fn build_zone_source(config: &Config) -> Arc<dyn ZoneSourcePort> {
    Arc::new(FileZoneSource::new(
        config.zone.file.clone(),
        config.zone.name.clone(),
        config.zone.log_garbage,
    ))
}
