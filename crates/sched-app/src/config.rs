//! Application configuration loading from file and environment variables.

use chrono::{DateTime, TimeDelta, Utc};
use sched_db::DbRuntimeSettings;
use sched_types::NewAppointment;
use serde::Deserialize;
use thiserror::Error;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Range query settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Appointments scheduled at startup.
    #[serde(default)]
    pub seed: Vec<SeedAppointment>,
}

/// Database configuration.
///
/// The data-source fields follow the usual `user:password@host:port/database`
/// shape. The embedded SQLite engine opens `database` as a file path.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database name; the SQLite file path.
    #[serde(default = "default_db_name")]
    pub database: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// How long opening the database may take, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Drop and recreate the appointments table on startup. Destroys data.
    #[serde(default)]
    pub reset_on_start: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "sched_store=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Range query configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Width of the listed window, in days from now.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

/// An appointment to schedule at startup, positioned relative to the
/// time the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedAppointment {
    pub client_name: String,
    pub description: String,
    #[serde(default)]
    pub offset_days: i64,
    #[serde(default)]
    pub offset_hours: i64,
    #[serde(default)]
    pub confirmed: bool,
}

impl SeedAppointment {
    /// Resolves the relative offset against `now`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` if the offset does not land on a
    /// representable timestamp.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<NewAppointment, ConfigError> {
        let at = TimeDelta::try_days(self.offset_days)
            .zip(TimeDelta::try_hours(self.offset_hours))
            .and_then(|(days, hours)| days.checked_add(&hours))
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or_else(|| ConfigError::OutOfRange {
                field: "seed.offset_days/offset_hours",
                detail: format!(
                    "'{}' at {}d {}h",
                    self.client_name, self.offset_days, self.offset_hours
                ),
            })?;

        Ok(
            NewAppointment::new(self.client_name.clone(), at, self.description.clone())
                .confirmed(self.confirmed),
        )
    }
}

impl QueryConfig {
    /// End of the listed window starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` if `window_days` overflows the
    /// timestamp range.
    pub fn window_end(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
        TimeDelta::try_days(self.window_days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| ConfigError::OutOfRange {
                field: "query.window_days",
                detail: self.window_days.to_string(),
            })
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_db_name() -> String {
    "appointments.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_connect_timeout_ms() -> u64 {
    DbRuntimeSettings::default().connect_timeout_ms
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_window_days() -> i64 {
    7
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            database: default_db_name(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reset_on_start: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl DatabaseConfig {
    /// Renders the data-source string.
    pub fn dsn(&self) -> String {
        self.render_dsn(&self.password)
    }

    /// Renders the data-source string with the password masked, for logs.
    pub fn redacted_dsn(&self) -> String {
        if self.password.is_empty() {
            self.render_dsn("")
        } else {
            self.render_dsn("****")
        }
    }

    fn render_dsn(&self, password: &str) -> String {
        format!(
            "{}:{}@tcp({}:{})/{}?charset=utf8mb4&parseTime=True&loc=Local",
            self.username, password, self.host, self.port, self.database
        )
    }

    /// Pool tunables derived from this section.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
            connect_timeout_ms: self.connect_timeout_ms,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A relative time setting lands outside the representable range.
    #[error("{field} out of range: {detail}")]
    OutOfRange {
        /// The offending setting.
        field: &'static str,
        /// The value that overflowed.
        detail: String,
    },
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides from the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies environment variable overrides using `lookup` to read them.
///
/// - `DB_USERNAME`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`, `DB_DATABASE`
///   override the matching `database` fields
/// - `SCHED_LOG_LEVEL` overrides `logging.level`
/// - `SCHED_LOG_JSON` overrides `logging.json` (set to "true" or "1")
///
/// Unparseable numeric values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(username) = lookup("DB_USERNAME") {
        config.database.username = username;
    }
    if let Some(password) = lookup("DB_PASSWORD") {
        config.database.password = password;
    }
    if let Some(host) = lookup("DB_HOST") {
        config.database.host = host;
    }
    if let Some(port) = lookup("DB_PORT") {
        if let Ok(parsed) = port.parse() {
            config.database.port = parsed;
        }
    }
    if let Some(database) = lookup("DB_DATABASE") {
        config.database.database = database;
    }
    if let Some(level) = lookup("SCHED_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("SCHED_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
