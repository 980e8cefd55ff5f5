use payment_timeline::{
    config::{Config, ConfigManager, VerifierConfig, YearRange},
    ConfigError, MonthCache,
};
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("engine.json"));
    assert_eq!(manager.load().unwrap(), Config::default());
    assert!(!manager.path().exists());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("nested").join("engine.json"));
    let mut config = Config::default();
    config.log_filter = "payment_timeline=debug".into();
    config.month_cache.prewarm = Some(YearRange {
        from: 2020,
        to: 2022,
    });
    config.verifier = VerifierConfig {
        collect_all_divergences: true,
    };

    manager.save(&config).unwrap();
    assert!(!dir.path().join("nested").join("engine.json.tmp").exists());
    assert_eq!(manager.load().unwrap(), config);

    let cache = MonthCache::new();
    assert_eq!(config.prewarm(&cache).unwrap(), 36);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ConfigManager::new(&path).load(),
        Err(ConfigError::Serde(_))
    ));
}

#[test]
fn invalid_values_are_refused_on_save() {
    let dir = tempdir().unwrap();
    let manager = ConfigManager::new(dir.path().join("engine.json"));
    let config = Config {
        log_filter: "  ".into(),
        ..Config::default()
    };
    assert!(matches!(manager.save(&config), Err(ConfigError::Invalid(_))));
    assert!(!manager.path().exists());
}
