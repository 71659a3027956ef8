//! Configuration resolution tests
//!
//! Uses serial_test: tests that read or set SHELFAWARE_* / SHELFWARE_HOST
//! variables are marked #[serial] so they never race each other.

use clap::Parser;
use serial_test::serial;
use shelfaware_server::config::{
    load_toml_config, Args, ServerConfig, TomlConfig, DEFAULT_DATABASE, DEFAULT_FRONTEND_URL,
    DEFAULT_HOST, DEFAULT_PORT,
};
use std::env;
use std::io::Write;
use std::path::PathBuf;

const ENV_VARS: &[&str] = &[
    "SHELFAWARE_HOST",
    "SHELFWARE_HOST",
    "SHELFAWARE_PORT",
    "SHELFAWARE_FRONTEND_URL",
    "SHELFAWARE_DATABASE",
    "SHELFAWARE_OPENFOODS_URL",
    "SHELFAWARE_PRODUCT_CACHE",
    "SHELFAWARE_CONFIDENCE_THRESHOLD",
    "SHELFAWARE_CONFIG",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn parse(args: &[&str]) -> Args {
    Args::parse_from(std::iter::once("shelfaware-server").chain(args.iter().copied()))
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();

    let config = ServerConfig::from_sources(parse(&[]), TomlConfig::default()).unwrap();

    assert_eq!(config.host, DEFAULT_HOST);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.frontend_url, DEFAULT_FRONTEND_URL);
    assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.openfoods_url, "https://world.openfoodfacts.org/api/v0/product/");
    assert!(config.product_cache);
    assert_eq!(config.confidence_threshold, 0.5);
    assert_eq!(config.bind_address(), "localhost:8000");
}

#[test]
#[serial]
fn test_priority_cli_over_env_over_toml() {
    clear_env();
    env::set_var("SHELFAWARE_PORT", "9000");
    env::set_var("SHELFAWARE_HOST", "0.0.0.0");

    let toml_config = TomlConfig {
        host: Some("toml-host".to_string()),
        port: Some(7000),
        frontend_url: Some("https://pantry.example".to_string()),
        ..Default::default()
    };

    let config =
        ServerConfig::from_sources(parse(&["--port", "8080"]), toml_config).unwrap();

    assert_eq!(config.port, 8080, "CLI beats env");
    assert_eq!(config.host, "0.0.0.0", "env beats TOML");
    assert_eq!(config.frontend_url, "https://pantry.example", "TOML beats default");

    clear_env();
}

#[test]
#[serial]
fn test_legacy_host_variable() {
    clear_env();
    env::set_var("SHELFWARE_HOST", "127.0.0.1");

    let config = ServerConfig::from_sources(parse(&[]), TomlConfig::default()).unwrap();
    assert_eq!(config.host, "127.0.0.1");

    // The correctly spelled variable still wins
    env::set_var("SHELFAWARE_HOST", "0.0.0.0");
    let config = ServerConfig::from_sources(parse(&[]), TomlConfig::default()).unwrap();
    assert_eq!(config.host, "0.0.0.0");

    clear_env();
}

#[test]
#[serial]
fn test_product_cache_can_be_disabled() {
    clear_env();

    let config =
        ServerConfig::from_sources(parse(&["--product-cache", "false"]), TomlConfig::default())
            .unwrap();
    assert!(!config.product_cache);

    env::set_var("SHELFAWARE_PRODUCT_CACHE", "false");
    let config = ServerConfig::from_sources(parse(&[]), TomlConfig::default()).unwrap();
    assert!(!config.product_cache);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_threshold_rejected() {
    clear_env();

    let result = ServerConfig::from_sources(
        parse(&["--confidence-threshold", "1.5"]),
        TomlConfig::default(),
    );
    assert!(matches!(result, Err(shelfaware_common::Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_frontend_origin_rejected() {
    clear_env();

    let toml_config = TomlConfig {
        frontend_url: Some("http://bad\u{7f}origin".to_string()),
        ..Default::default()
    };
    let result = ServerConfig::from_sources(parse(&[]), toml_config);
    assert!(matches!(result, Err(shelfaware_common::Error::Config(_))));
}

#[test]
fn test_load_toml_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host = "0.0.0.0"
port = 8123
database = "/var/lib/shelfaware/inventory.db"
product_cache = false
confidence_threshold = 0.7
"#
    )
    .unwrap();

    let config = load_toml_config(Some(file.path())).unwrap();

    assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(8123));
    assert_eq!(config.database, Some(PathBuf::from("/var/lib/shelfaware/inventory.db")));
    assert_eq!(config.product_cache, Some(false));
    assert_eq!(config.confidence_threshold, Some(0.7));
    assert_eq!(config.frontend_url, None);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number").unwrap();

    let result = load_toml_config(Some(file.path()));
    assert!(matches!(result, Err(shelfaware_common::Error::Config(_))));
}

#[test]
fn test_missing_explicit_config_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_toml_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(shelfaware_common::Error::Config(_))));
}
