//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "mensa";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;
const DEFAULT_CACHE_SWEEP_INTERVAL_SECONDS: u64 = 60;
const DEFAULT_MEDIA_DIR: &str = "media";
const DEFAULT_EXPORT_CONCURRENCY: u32 = 1;

/// Command-line arguments for the mensa binary.
#[derive(Debug, Parser)]
#[command(name = "mensa", version, about = "Mensa menu-management server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MENSA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the mensa HTTP service and job workers.
    Serve(Box<ServeArgs>),
    /// Write the full menu hierarchy to a CSV spreadsheet and exit.
    #[command(name = "export")]
    ExportHierarchy(ExportArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Toggle the response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache entry TTL in seconds.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the directory export spreadsheets are written to.
    #[arg(long = "media-directory", value_name = "PATH")]
    pub media_directory: Option<PathBuf>,

    /// Override the export worker concurrency.
    #[arg(long = "jobs-export-concurrency", value_name = "COUNT")]
    pub jobs_export_concurrency: Option<u32>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Path to the CSV file to write.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("unknown log level `{0}`, expected trace|debug|info|warn|error")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(SettingsError::InvalidLogLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: NonZeroU32::new(DEFAULT_DB_MAX_CONNECTIONS)
                .expect("default pool size is non-zero"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_CACHE_SWEEP_INTERVAL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    pub directory: PathBuf,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_MEDIA_DIR),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsSettings {
    pub export_concurrency: NonZeroU32,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            export_concurrency: NonZeroU32::new(DEFAULT_EXPORT_CONCURRENCY)
                .expect("default concurrency is non-zero"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub media: MediaSettings,
    pub jobs: JobsSettings,
    pub logging: LoggingSettings,
}

/// Parse CLI arguments and resolve settings with file, environment and CLI
/// precedence applied in that order.
pub fn load_with_cli() -> Result<(CliArgs, Settings), SettingsError> {
    let cli = CliArgs::parse();
    let mut settings = load(cli.config_file.as_deref())?;

    match &cli.command {
        Some(Command::Serve(args)) => apply_serve_overrides(&mut settings, &args.overrides)?,
        Some(Command::ExportHierarchy(args)) => {
            apply_database_override(&mut settings, &args.database);
        }
        None => {}
    }

    Ok((cli, settings))
}

fn load(config_file: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path.to_path_buf()));
    }

    let config = builder
        .add_source(Environment::with_prefix("MENSA").separator("__"))
        .build()?;

    Ok(config.try_deserialize()?)
}

fn apply_serve_overrides(
    settings: &mut Settings,
    overrides: &ServeOverrides,
) -> Result<(), SettingsError> {
    if let Some(host) = &overrides.server_host {
        settings.server.host = host.clone();
    }
    if let Some(port) = overrides.server_port {
        settings.server.port = port;
    }
    if let Some(level) = &overrides.log_level {
        settings.logging.level = level.parse()?;
    }
    if let Some(json) = overrides.log_json {
        settings.logging.format = if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };
    }
    if let Some(url) = &overrides.database_url {
        settings.database.url = Some(url.clone());
    }
    if let Some(max) = overrides.database_max_connections.and_then(NonZeroU32::new) {
        settings.database.max_connections = max;
    }
    if let Some(enabled) = overrides.cache_enabled {
        settings.cache.enabled = enabled;
    }
    if let Some(ttl) = overrides.cache_ttl_seconds {
        settings.cache.ttl_seconds = ttl;
    }
    if let Some(dir) = &overrides.media_directory {
        settings.media.directory = dir.clone();
    }
    if let Some(concurrency) = overrides
        .jobs_export_concurrency
        .and_then(NonZeroU32::new)
    {
        settings.jobs.export_concurrency = concurrency;
    }

    Ok(())
}

fn apply_database_override(settings: &mut Settings, database: &DatabaseOverride) {
    if let Some(url) = &database.database_url {
        settings.database.url = Some(url.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_resolve_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").expect("defaults");

        assert_eq!(settings.server.host, DEFAULT_HOST);
        assert_eq!(settings.server.port, DEFAULT_PORT);
        assert!(settings.database.url.is_none());
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.ttl_seconds, DEFAULT_CACHE_TTL_SECONDS);
        assert_eq!(settings.media.directory, PathBuf::from(DEFAULT_MEDIA_DIR));
        assert_eq!(settings.logging.level, LogLevel::Info);
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    fn serve_overrides_win_over_file_values() {
        let mut settings = Settings::default();
        let overrides = ServeOverrides {
            server_port: Some(9000),
            log_level: Some("debug".to_string()),
            log_json: Some(true),
            database_url: Some("postgres://localhost/mensa".to_string()),
            cache_enabled: Some(false),
            ..ServeOverrides::default()
        };

        apply_serve_overrides(&mut settings, &overrides).expect("valid overrides");

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(
            settings.database.url.as_deref(),
            Some("postgres://localhost/mensa")
        );
        assert!(!settings.cache.enabled);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut settings = Settings::default();
        let overrides = ServeOverrides {
            log_level: Some("shouty".to_string()),
            ..ServeOverrides::default()
        };

        assert!(matches!(
            apply_serve_overrides(&mut settings, &overrides),
            Err(SettingsError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn zero_pool_size_override_is_ignored() {
        let mut settings = Settings::default();
        let overrides = ServeOverrides {
            database_max_connections: Some(0),
            ..ServeOverrides::default()
        };

        apply_serve_overrides(&mut settings, &overrides).expect("valid overrides");
        assert_eq!(
            settings.database.max_connections.get(),
            DEFAULT_DB_MAX_CONNECTIONS
        );
    }
}
