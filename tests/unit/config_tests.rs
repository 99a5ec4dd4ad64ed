// Configuration module unit tests

use kura::cache::{DiskCacheConfig, FileNaming, OversizePolicy};
use kura::config::*;
use std::path::PathBuf;

#[test]
fn test_can_create_config_struct() {
    let config = Config {
        cache: DiskCacheConfig::new("/tmp/kura").with_max_size(1024),
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Json,
        },
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_can_deserialize_minimal_valid_yaml_config() {
    let yaml = r#"
cache:
  cache_dir: /data/cache
"#;
    let config: Config = serde_yaml::from_str(yaml).expect("Failed to deserialize YAML");
    assert_eq!(config.cache.cache_dir, PathBuf::from("/data/cache"));
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_can_parse_every_cache_option() {
    let yaml = r#"
cache:
  cache_dir: /data/cache
  max_cache_size_bytes: 268435456
  hysteresis: 0.8
  file_naming: sha256
  oversize_policy: reject
logging:
  level: "kura=trace,warn"
  format: json
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.cache.max_cache_size_bytes, 256 * 1024 * 1024);
    assert_eq!(config.cache.hysteresis, 0.8);
    assert_eq!(config.cache.file_naming, FileNaming::Sha256);
    assert_eq!(config.cache.oversize_policy, OversizePolicy::Reject);
    assert_eq!(config.logging.level, "kura=trace,warn");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_deserialization_fails_with_invalid_yaml() {
    let yaml = r#"
cache:
  max_cache_size_bytes: [invalid syntax here}
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[test]
fn test_config_deserialization_fails_with_wrong_type() {
    let yaml = r#"
cache:
  max_cache_size_bytes: "lots"
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[test]
fn test_validation_rejects_zero_budget() {
    let yaml = r#"
cache:
  max_cache_size_bytes: 0
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.contains("max_cache_size_bytes"));
}

#[test]
fn test_env_var_substitution_in_budget() {
    std::env::set_var("KURA_UNIT_MAX_BYTES", "4096");
    let yaml = r#"
cache:
  max_cache_size_bytes: ${KURA_UNIT_MAX_BYTES}
"#;
    let config = Config::from_yaml_with_env(yaml).unwrap();
    assert_eq!(config.cache.max_cache_size_bytes, 4096);
    std::env::remove_var("KURA_UNIT_MAX_BYTES");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let err = Config::from_file("/definitely/not/here/kura.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}
