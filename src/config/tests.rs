//! Tests for config functionality.

use crate::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.spool_dir, PathBuf::from("/var/mail"));
    assert_eq!(config.quarantine_prefix, "mail");
    assert_eq!(config.link_eviction_limit, 16);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    assert_eq!(config.spool_dir, PathBuf::from("/var/mail"));
    assert_eq!(config.quarantine_prefix, "mail");
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
spool_dir: /var/spool/mail
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.spool_dir, PathBuf::from("/var/spool/mail"));
    assert_eq!(config.quarantine_prefix, "mail");
    assert_eq!(config.link_eviction_limit, 16);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
spool_dir: /srv/mail
some_future_field: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.spool_dir, PathBuf::from("/srv/mail"));
}

#[test]
fn test_relative_spool_dir_rejected() {
    let result = Config::from_yaml("spool_dir: mail\n");
    let err = result.unwrap_err();
    assert!(err.to_string().contains("spool_dir must be absolute"));
}

#[test]
fn test_bad_quarantine_prefix_rejected() {
    let err = Config::from_yaml("quarantine_prefix: \"\"\n").unwrap_err();
    assert!(err.to_string().contains("quarantine_prefix must be non-empty"));

    let err = Config::from_yaml("quarantine_prefix: a/b\n").unwrap_err();
    assert!(err.to_string().contains("must not contain '/'"));
}

#[test]
fn test_zero_link_eviction_limit_rejected() {
    let err = Config::from_yaml("link_eviction_limit: 0\n").unwrap_err();
    assert!(err.to_string().contains("link_eviction_limit"));
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("spool_dir: [unterminated").unwrap_err();
    assert!(matches!(err, crate::error::LockSpoolError::UserError(_)));
}

#[test]
fn test_yaml_roundtrip_preserves_values() {
    let config = Config {
        spool_dir: PathBuf::from("/var/spool/mail"),
        quarantine_prefix: "bad".to_string(),
        link_eviction_limit: 4,
    };

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed.spool_dir, config.spool_dir);
    assert_eq!(parsed.quarantine_prefix, "bad");
    assert_eq!(parsed.link_eviction_limit, 4);
}

#[test]
fn test_load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lockspool.yaml");
    std::fs::write(&path, "spool_dir: /var/mail\nlink_eviction_limit: 8\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.link_eviction_limit, 8);
}

#[test]
fn test_load_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let err = Config::load(temp.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}
