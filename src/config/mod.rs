//! Configuration loading for the plant data service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `PLANTDATA_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, fmt, net::SocketAddr, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Secret used to sign session cookies when none is configured. Only
/// accepted for the `local` and `test` profiles.
const DEV_SESSION_SECRET: &str = "plantdata-local-development-secret";

/// Minimum accepted length of a configured session secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 16;

/// Where login credentials are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Credentials stored (hashed) in the `plant_users` and `admin_users` tables.
    #[default]
    Table,
    /// One fixed plant pair and one fixed admin pair from configuration.
    Static,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(AuthMode::Table),
            "static" => Ok(AuthMode::Static),
            _ => Err(ConfigError::InvalidAuthMode {
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Table => f.write_str("table"),
            AuthMode::Static => f.write_str("static"),
        }
    }
}

/// Application configuration derived from `PLANTDATA_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default)]
    pub session_cookie_secure: bool,
    /// Lifetime of a login, in seconds from the moment it was granted
    #[serde(default = "default_session_max_age_secs")]
    pub session_max_age_secs: u64,
    #[serde(default)]
    pub auth_mode: AuthMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_pass: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_pass: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            session_secret: None,
            session_cookie_secure: false,
            session_max_age_secs: default_session_max_age_secs(),
            auth_mode: AuthMode::default(),
            admin_user: None,
            admin_pass: None,
            plant_user: None,
            plant_pass: None,
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// True for the `local` and `test` profiles, which tolerate development defaults.
    pub fn is_development(&self) -> bool {
        matches!(self.profile.as_str(), "local" | "test")
    }

    /// The secret used to sign session cookies.
    pub fn effective_session_secret(&self) -> &str {
        self.session_secret.as_deref().unwrap_or(DEV_SESSION_SECRET)
    }

    /// The configured admin credential pair, if both halves are present.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        Some((self.admin_user.as_deref()?, self.admin_pass.as_deref()?))
    }

    /// The configured plant credential pair, if both halves are present.
    pub fn plant_credentials(&self) -> Option<(&str, &str)> {
        Some((self.plant_user.as_deref()?, self.plant_pass.as_deref()?))
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.session_secret.is_some() {
            config.session_secret = Some("[REDACTED]".to_string());
        }
        if config.admin_pass.is_some() {
            config.admin_pass = Some("[REDACTED]".to_string());
        }
        if config.plant_pass.is_some() {
            config.plant_pass = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.session_secret.as_deref() {
            Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN => {
                return Err(ConfigError::InvalidSessionSecretLength {
                    length: secret.len(),
                });
            }
            Some(_) => {}
            None if !self.is_development() => return Err(ConfigError::MissingSessionSecret),
            None => {}
        }

        if self.admin_user.is_some() != self.admin_pass.is_some() {
            return Err(ConfigError::IncompleteCredentials { role: "admin" });
        }
        if self.plant_user.is_some() != self.plant_pass.is_some() {
            return Err(ConfigError::IncompleteCredentials { role: "plant" });
        }

        if self.auth_mode == AuthMode::Static {
            if self.admin_credentials().is_none() {
                return Err(ConfigError::MissingStaticCredentials { role: "admin" });
            }
            if self.plant_credentials().is_none() {
                return Err(ConfigError::MissingStaticCredentials { role: "plant" });
            }
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidDbMaxConnections);
        }

        if self.session_max_age_secs == 0 {
            return Err(ConfigError::InvalidSessionMaxAge);
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://plantdata.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_session_max_age_secs() -> u64 {
    12 * 60 * 60
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("session secret is missing; set PLANTDATA_SESSION_SECRET environment variable")]
    MissingSessionSecret,
    #[error("session secret must be at least 16 bytes, got {length} bytes")]
    InvalidSessionSecretLength { length: usize },
    #[error("invalid auth mode '{value}'; expected 'table' or 'static'")]
    InvalidAuthMode { value: String },
    #[error("static auth mode requires {role} credentials; set both user and password variables")]
    MissingStaticCredentials { role: &'static str },
    #[error("{role} credentials are incomplete; user and password must be set together")]
    IncompleteCredentials { role: &'static str },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("database max connections must be at least 1")]
    InvalidDbMaxConnections,
    #[error("session max age must be at least 1 second")]
    InvalidSessionMaxAge,
}

/// Loads configuration using layered `.env` files and `PLANTDATA_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads and validates the configuration.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("PLANTDATA_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        // Hosting platforms commonly hand out a bare PORT; honour it when no
        // explicit bind address was configured.
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .or_else(|| {
                env::var("PORT")
                    .ok()
                    .map(|port| port.trim().to_string())
                    .filter(|port| !port.is_empty())
                    .map(|port| format!("0.0.0.0:{}", port))
            })
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);

        let session_secret = non_empty(layered.remove("SESSION_SECRET"));
        let session_cookie_secure = layered
            .remove("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let session_max_age_secs = layered
            .remove("SESSION_MAX_AGE_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_else(default_session_max_age_secs);
        let auth_mode = match non_empty(layered.remove("AUTH_MODE")) {
            Some(value) => value.parse()?,
            None => AuthMode::default(),
        };

        let admin_user = non_empty(layered.remove("ADMIN_USER"));
        let admin_pass = non_blank(layered.remove("ADMIN_PASS"));
        let plant_user = non_empty(layered.remove("PLANT_USER"));
        let plant_pass = non_blank(layered.remove("PLANT_PASS"));

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            session_secret,
            session_cookie_secure,
            session_max_age_secs,
            auth_mode,
            admin_user,
            admin_pass,
            plant_user,
            plant_pass,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("PLANTDATA_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("PLANTDATA_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Passwords are kept byte for byte; only an all-whitespace value counts as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|val| !val.trim().is_empty())
}
