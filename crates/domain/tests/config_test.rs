use ferrous_rpz_domain::{CliOverrides, Config};

#[test]
fn test_defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.cache.size, 10_000);
    assert_eq!(config.batch.update_size, 100);
    assert_eq!(config.batch.update_frequency, 30);
    assert!((config.batch.threshold - 0.1).abs() < 1e-9);
    assert!((config.cache.trending_alpha - 0.1).abs() < 1e-9);
}

#[test]
fn test_parse_full_document() {
    let config: Config = toml::from_str(
        r#"
        [zone]
        name = "rpz.internal"
        update_target = "192.0.2.53:53"
        file = "/var/lib/rpz/rearview.zone"
        log_garbage = false

        [cache]
        size = 500
        eviction_log_size = 10
        trending_alpha = 0.25

        [batch]
        update_size = 32
        update_frequency = 60
        threshold = 0.5
        refresh_log_size = 20
        update_timeout = 3

        [telemetry]
        bind_address = "0.0.0.0:3053"

        [console]
        enabled = false

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.zone.name, "rpz.internal");
    assert_eq!(config.cache.size, 500);
    assert_eq!(config.batch.update_size, 32);
    assert!(!config.console.enabled);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_partial_document_fills_defaults() {
    let config: Config = toml::from_str(
        r#"
        [zone]
        name = "rpz.internal."
        "#,
    )
    .unwrap();
    assert_eq!(config.batch.update_size, 100);
    assert_eq!(config.telemetry.bind_address, "127.0.0.1:3053");
}

#[test]
fn test_cli_overrides_win() {
    let overrides = CliOverrides {
        zone_name: Some("other.zone.".to_string()),
        update_target: Some("198.51.100.1:5353".to_string()),
        log_level: Some("trace".to_string()),
        ..Default::default()
    };
    let config = Config::load(None, overrides).unwrap();
    assert_eq!(config.zone.name, "other.zone.");
    assert_eq!(config.zone.update_target, "198.51.100.1:5353");
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_zone_name_is_normalized_to_absolute() {
    let config = Config::load(
        None,
        CliOverrides {
            zone_name: Some("RPZ.Example".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(config.zone.name, "rpz.example.");
}

#[test]
fn test_validation_rejects_bad_threshold() {
    let mut config = Config::default();
    config.batch.threshold = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_bad_target() {
    let mut config = Config::default();
    config.zone.update_target = "not-a-socket-addr".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_zero_frequency() {
    let mut config = Config::default();
    config.batch.update_frequency = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_rejects_bad_alpha() {
    let mut config = Config::default();
    config.cache.trending_alpha = 0.0;
    assert!(config.validate().is_err());
    config.cache.trending_alpha = 1.5;
    assert!(config.validate().is_err());
}
