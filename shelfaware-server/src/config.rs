//! Server configuration
//!
//! Each setting resolves in priority order:
//! 1. Command-line flag
//! 2. Environment variable
//! 3. TOML config file (`--config`, else `<config dir>/shelfaware/config.toml`)
//! 4. Compiled default

use clap::Parser;
use serde::Deserialize;
use shelfaware_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::services::barcode::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::services::openfoods_client::OPENFOODS_BASE_URL;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_DATABASE: &str = "food_inventory.db";

/// Misspelled host variable honored for existing deployments
const LEGACY_HOST_ENV: &str = "SHELFWARE_HOST";

/// Command-line arguments; each flag falls back to its environment variable
#[derive(Debug, Default, Parser)]
#[command(name = "shelfaware-server", version, about = "Household food inventory service")]
pub struct Args {
    /// Interface to bind
    #[arg(long, env = "SHELFAWARE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "SHELFAWARE_PORT")]
    pub port: Option<u16>,

    /// Frontend origin allowed by CORS
    #[arg(long, env = "SHELFAWARE_FRONTEND_URL")]
    pub frontend_url: Option<String>,

    /// SQLite database file
    #[arg(long, env = "SHELFAWARE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Product catalog base URL
    #[arg(long, env = "SHELFAWARE_OPENFOODS_URL")]
    pub openfoods_url: Option<String>,

    /// Cache product lookups in the database (true/false)
    #[arg(long, env = "SHELFAWARE_PRODUCT_CACHE")]
    pub product_cache: Option<bool>,

    /// Minimum detector confidence for a barcode region
    #[arg(long, env = "SHELFAWARE_CONFIDENCE_THRESHOLD")]
    pub confidence_threshold: Option<f32>,

    /// TOML config file
    #[arg(long, env = "SHELFAWARE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Settings read from the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub frontend_url: Option<String>,
    pub database: Option<PathBuf>,
    pub openfoods_url: Option<String>,
    pub product_cache: Option<bool>,
    pub confidence_threshold: Option<f32>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub database_path: PathBuf,
    pub openfoods_url: String,
    pub product_cache: bool,
    pub confidence_threshold: f32,
}

impl ServerConfig {
    /// Resolve from parsed arguments, the environment and the config file
    pub fn resolve(args: Args) -> Result<Self> {
        let toml_config = load_toml_config(args.config.as_deref())?;
        Self::from_sources(args, toml_config)
    }

    /// Merge already-loaded sources and validate the result
    pub fn from_sources(args: Args, toml_config: TomlConfig) -> Result<Self> {
        let legacy_host = std::env::var(LEGACY_HOST_ENV).ok();
        if args.host.is_none() && legacy_host.is_some() {
            warn!("{} is deprecated, use SHELFAWARE_HOST", LEGACY_HOST_ENV);
        }

        let config = Self {
            host: args
                .host
                .or(legacy_host)
                .or(toml_config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT),
            frontend_url: args
                .frontend_url
                .or(toml_config.frontend_url)
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            database_path: args
                .database
                .or(toml_config.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            openfoods_url: args
                .openfoods_url
                .or(toml_config.openfoods_url)
                .unwrap_or_else(|| OPENFOODS_BASE_URL.to_string()),
            product_cache: args.product_cache.or(toml_config.product_cache).unwrap_or(true),
            confidence_threshold: args
                .confidence_threshold
                .or(toml_config.confidence_threshold)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::Config(format!(
                "confidence_threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            )));
        }
        if self.host.trim().is_empty() {
            return Err(Error::Config("host cannot be empty".to_string()));
        }
        if axum::http::HeaderValue::from_str(&self.frontend_url).is_err() {
            return Err(Error::Config(format!(
                "frontend_url is not a valid origin: {:?}",
                self.frontend_url
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML config file
///
/// An explicit path must exist. Without one, the per-user default location is
/// tried and a missing file yields the defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shelfaware").join("config.toml"))
}
