#![allow(dead_code)]

mod mock_ports;

pub use mock_ports::MockDnsUpdatePort;

use ferrous_rpz_domain::Config;

/// Config tuned so engine tests promote batches on the first tick.
pub fn eager_config(cache_size: usize) -> Config {
    let mut config = Config::default();
    config.cache.size = cache_size;
    config.batch.update_size = 100;
    config.batch.update_frequency = 0;
    config.batch.threshold = 0.0;
    config.batch.update_timeout = 5;
    config
}
