//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "textpad";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 19998;
const DEFAULT_DB_PATH: &str = "content.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_MAIN_TEXT_FILE: &str = "main.txt";
const DEFAULT_SETTINGS_FILE: &str = "settings.txt";
const DEFAULT_META_DIR: &str = "meta";
const DEFAULT_FAVICON_FILE: &str = "favicon.ico";
const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 10;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

/// Command-line arguments for the textpad binary.
#[derive(Debug, Parser)]
#[command(name = "textpad", version, about = "Textpad note server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TEXTPAD_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the textpad HTTP service.
    Serve(Box<ServeArgs>),
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

    /// Override the SQLite database file path.
    #[arg(long = "database-path", value_name = "PATH")]
    pub database_path: Option<PathBuf>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the main page text file.
    #[arg(long = "data-main-text-file", value_name = "PATH")]
    pub main_text_file: Option<PathBuf>,

    /// Override the runtime settings file.
    #[arg(long = "data-settings-file", value_name = "PATH")]
    pub settings_file: Option<PathBuf>,

    /// Override the static asset directory.
    #[arg(long = "data-meta-dir", value_name = "PATH")]
    pub meta_dir: Option<PathBuf>,

    /// Override the favicon file path.
    #[arg(long = "data-favicon-file", value_name = "PATH")]
    pub favicon_file: Option<PathBuf>,

    /// Override the write-behind flush interval.
    #[arg(long = "sync-flush-interval-seconds", value_name = "SECONDS")]
    pub flush_interval_seconds: Option<u64>,

    /// Override the cache refresh interval.
    #[arg(long = "sync-refresh-interval-seconds", value_name = "SECONDS")]
    pub refresh_interval_seconds: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub data: DataSettings,
    pub sync: SyncSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: NonZeroU32,
}

/// On-disk layout of everything outside the database.
#[derive(Debug, Clone)]
pub struct DataSettings {
    pub main_text_file: PathBuf,
    pub settings_file: PathBuf,
    pub meta_dir: PathBuf,
    pub favicon_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub flush_interval: Duration,
    pub refresh_interval: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("TEXTPAD").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    data: RawDataSettings,
    sync: RawSyncSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(path) = overrides.database_path.as_ref() {
            self.database.path = Some(path.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(path) = overrides.main_text_file.as_ref() {
            self.data.main_text_file = Some(path.clone());
        }
        if let Some(path) = overrides.settings_file.as_ref() {
            self.data.settings_file = Some(path.clone());
        }
        if let Some(path) = overrides.meta_dir.as_ref() {
            self.data.meta_dir = Some(path.clone());
        }
        if let Some(path) = overrides.favicon_file.as_ref() {
            self.data.favicon_file = Some(path.clone());
        }
        if let Some(seconds) = overrides.flush_interval_seconds {
            self.sync.flush_interval_seconds = Some(seconds);
        }
        if let Some(seconds) = overrides.refresh_interval_seconds {
            self.sync.refresh_interval_seconds = Some(seconds);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            data,
            sync,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let database = build_database_settings(database)?;
        let data = build_data_settings(data)?;
        let sync = build_sync_settings(sync)?;

        Ok(Self {
            server,
            logging,
            database,
            data,
            sync,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let listen_addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.listen_addr", reason))?;

    Ok(ServerSettings { listen_addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let path = database
        .path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid("database.path", "path must not be empty"));
    }

    let max_value = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_value.into(), "database.max_connections")?;

    Ok(DatabaseSettings {
        path,
        max_connections,
    })
}

fn build_data_settings(data: RawDataSettings) -> Result<DataSettings, LoadError> {
    let main_text_file = data
        .main_text_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAIN_TEXT_FILE));
    if main_text_file.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "data.main_text_file",
            "path must not be empty",
        ));
    }

    let settings_file = data
        .settings_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    if settings_file.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "data.settings_file",
            "path must not be empty",
        ));
    }

    let meta_dir = data.meta_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_META_DIR));
    if meta_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid("data.meta_dir", "path must not be empty"));
    }

    let favicon_file = data
        .favicon_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FAVICON_FILE));

    Ok(DataSettings {
        main_text_file,
        settings_file,
        meta_dir,
        favicon_file,
    })
}

fn build_sync_settings(sync: RawSyncSettings) -> Result<SyncSettings, LoadError> {
    let flush_seconds = sync
        .flush_interval_seconds
        .unwrap_or(DEFAULT_FLUSH_INTERVAL_SECS);
    if flush_seconds == 0 {
        return Err(LoadError::invalid(
            "sync.flush_interval_seconds",
            "must be greater than zero",
        ));
    }

    let refresh_seconds = sync
        .refresh_interval_seconds
        .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
    if refresh_seconds == 0 {
        return Err(LoadError::invalid(
            "sync.refresh_interval_seconds",
            "must be greater than zero",
        ));
    }

    Ok(SyncSettings {
        flush_interval: Duration::from_secs(flush_seconds),
        refresh_interval: Duration::from_secs(refresh_seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    path: Option<PathBuf>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDataSettings {
    main_text_file: Option<PathBuf>,
    settings_file: Option<PathBuf>,
    meta_dir: Option<PathBuf>,
    favicon_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSyncSettings {
    flush_interval_seconds: Option<u64>,
    refresh_interval_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
