use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub zone: ZoneConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Name of the RPZ receiving the synthesized PTR records.
    #[serde(default = "default_zone_name")]
    pub name: String,

    /// Address of the zone master accepting dynamic updates.
    #[serde(default = "default_update_target")]
    pub update_target: String,

    /// Zone master file read once at startup; missing file means a cold
    /// start with an empty view.
    #[serde(default = "default_zone_file")]
    pub file: String,

    /// Log unrecognized records found during the startup zone read.
    #[serde(default = "default_true")]
    pub log_garbage: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            name: default_zone_name(),
            update_target: default_update_target(),
            file: default_zone_file(),
            log_garbage: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Upper bound on the total resolution count across all associations.
    #[serde(default = "default_cache_size")]
    pub size: usize,

    /// Ring-buffer capacity for retained eviction-pass events.
    #[serde(default = "default_event_log_size")]
    pub eviction_log_size: usize,

    /// Exponential weight for the recency trend estimate.
    #[serde(default = "default_trending_alpha")]
    pub trending_alpha: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size: default_cache_size(),
            eviction_log_size: default_event_log_size(),
            trending_alpha: default_trending_alpha(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Hard cap on addresses per update transaction.
    #[serde(default = "default_batch_update_size")]
    pub update_size: usize,

    /// Minimum seconds between batch writes.
    #[serde(default = "default_batch_update_frequency")]
    pub update_frequency: u64,

    /// Fractional fill required before a batch writes on its timer.
    #[serde(default = "default_batch_threshold")]
    pub threshold: f64,

    /// Ring-buffer capacity for retained per-batch statistics.
    #[serde(default = "default_event_log_size")]
    pub refresh_log_size: usize,

    /// Seconds allowed for one update transaction before it is failed.
    #[serde(default = "default_update_timeout")]
    pub update_timeout: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            update_size: default_batch_update_size(),
            update_frequency: default_batch_update_frequency(),
            threshold: default_batch_threshold(),
            refresh_log_size: default_event_log_size(),
            update_timeout: default_update_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Bind address for the JSON/UDP telemetry listener.
    #[serde(default = "default_telemetry_bind")]
    pub bind_address: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            bind_address: default_telemetry_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_console_bind")]
    pub bind_address: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_console_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_zone_name() -> String {
    "rearview.example.".to_string()
}
fn default_update_target() -> String {
    "127.0.0.1:53".to_string()
}
fn default_zone_file() -> String {
    "rearview.zone".to_string()
}
fn default_cache_size() -> usize {
    10_000
}
fn default_event_log_size() -> usize {
    100
}
fn default_trending_alpha() -> f64 {
    0.1
}
fn default_batch_update_size() -> usize {
    100
}
fn default_batch_update_frequency() -> u64 {
    30
}
fn default_batch_threshold() -> f64 {
    0.1
}
fn default_update_timeout() -> u64 {
    5
}
fn default_telemetry_bind() -> String {
    "127.0.0.1:3053".to_string()
}
fn default_console_bind() -> String {
    "127.0.0.1:3047".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("ferrous-rpz.toml").exists() {
            Self::from_file("ferrous-rpz.toml")?
        } else if std::path::Path::new("/etc/ferrous-rpz/config.toml").exists() {
            Self::from_file("/etc/ferrous-rpz/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.normalize();
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(zone) = overrides.zone_name {
            self.zone.name = zone;
        }
        if let Some(target) = overrides.update_target {
            self.zone.update_target = target;
        }
        if let Some(bind) = overrides.telemetry_bind {
            self.telemetry.bind_address = bind;
        }
        if let Some(bind) = overrides.console_bind {
            self.console.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    fn normalize(&mut self) {
        let name = self.zone.name.trim().to_ascii_lowercase();
        self.zone.name = if name.ends_with('.') || name.is_empty() {
            name
        } else {
            format!("{}.", name)
        };
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone.name.is_empty() {
            return Err(ConfigError::Validation("Zone name cannot be empty".to_string()));
        }

        if self.zone.update_target.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid update target '{}'",
                self.zone.update_target
            )));
        }

        if self.telemetry.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid telemetry bind address '{}'",
                self.telemetry.bind_address
            )));
        }

        if self.console.enabled && self.console.bind_address.parse::<std::net::SocketAddr>().is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid console bind address '{}'",
                self.console.bind_address
            )));
        }

        if !(0.0..=1.0).contains(&self.batch.threshold) {
            return Err(ConfigError::Validation(format!(
                "Batch threshold {} outside [0.0, 1.0]",
                self.batch.threshold
            )));
        }

        if self.batch.update_size == 0 {
            return Err(ConfigError::Validation(
                "Batch update size cannot be 0".to_string(),
            ));
        }

        if self.batch.update_frequency == 0 {
            return Err(ConfigError::Validation(
                "Batch update frequency cannot be 0".to_string(),
            ));
        }

        if !(self.cache.trending_alpha > 0.0 && self.cache.trending_alpha <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "Trending alpha {} outside (0.0, 1.0]",
                self.cache.trending_alpha
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub zone_name: Option<String>,
    pub update_target: Option<String>,
    pub telemetry_bind: Option<String>,
    pub console_bind: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
