//! # Settings — configuration snapshots for the database and the mail relay
//!
//! Settings are read with the [`config`] crate from an optional `config.toml` in the
//! working directory, overridden by environment variables (a `.env` file is loaded
//! first through `dotenvy`). Keys are the lower-cased variable names, so
//! `MYSQL_HOST=db` and `mysql_host = "db"` in `config.toml` are equivalent.
//!
//! | Group | Variables |
//! |-------|-----------|
//! | Database | `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`, `MYSQL_PASSWORD`, `MYSQL_DATABASE` |
//! | Mail | `SMTP_SERVICE`, `SMTP_REQUIRE_TLS`, `MAIL_USER`, `MAIL_PASSWORD`, `MAIL_FROM`, `MAIL_TO` |
//! | Server | `PORT` (default `3000`), `PUBLIC_DIR` (default `public`) |
//!
//! Each group is validated as a unit by [`Settings::database`] and [`Settings::mail`]:
//! a missing, empty or whitespace-only value for any required key rejects the whole
//! group with a [`ConfigurationError`] naming the offending keys. Values themselves
//! never appear in errors, logs or `Debug` output.

use std::fmt;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PUBLIC_DIR: &str = "public";

/// Required database keys, in the order they are reported.
pub const REQUIRED_DATABASE_KEYS: [&str; 5] = [
    "MYSQL_HOST",
    "MYSQL_PORT",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "MYSQL_DATABASE",
];

/// Required mail keys, in the order they are reported.
pub const REQUIRED_MAIL_KEYS: [&str; 6] = [
    "SMTP_SERVICE",
    "SMTP_REQUIRE_TLS",
    "MAIL_USER",
    "MAIL_PASSWORD",
    "MAIL_FROM",
    "MAIL_TO",
];

/// A required setting is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("missing or blank settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to load settings: {0}")]
    Load(String),
}

impl From<ConfigError> for ConfigurationError {
    fn from(e: ConfigError) -> Self {
        Self::Load(e.to_string())
    }
}

/// Raw, unvalidated settings.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    port: Option<String>,
    public_dir: Option<String>,

    mysql_host: Option<String>,
    mysql_port: Option<String>,
    mysql_user: Option<String>,
    mysql_password: Option<String>,
    mysql_database: Option<String>,

    smtp_service: Option<String>,
    smtp_require_tls: Option<String>,
    mail_user: Option<String>,
    mail_password: Option<String>,
    mail_from: Option<String>,
    mail_to: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("port", &self.port)
            .field("public_dir", &self.public_dir)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load from `.env`, `config.toml` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::build(
            Config::builder()
                .add_source(
                    File::with_name("config.toml")
                        .format(FileFormat::Toml)
                        .required(false),
                )
                .add_source(Environment::default()),
        )
    }

    /// Build from explicit key/value pairs. Keys use the environment spelling.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(key.as_ref().to_lowercase(), value.into())?;
        }
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// Port the HTTP server binds to.
    pub fn port(&self) -> Result<u16, ConfigurationError> {
        match non_blank(&self.port) {
            Some(port) => parse_port("PORT", port),
            None => Ok(DEFAULT_PORT),
        }
    }

    /// Directory served for static assets.
    pub fn public_dir(&self) -> PathBuf {
        non_blank(&self.public_dir)
            .unwrap_or(DEFAULT_PUBLIC_DIR)
            .into()
    }

    /// Validate the database group.
    pub fn database(&self) -> Result<DatabaseSettings, ConfigurationError> {
        let mut missing = Vec::new();
        let host = required(&self.mysql_host, "MYSQL_HOST", &mut missing);
        let port = required(&self.mysql_port, "MYSQL_PORT", &mut missing);
        let user = required(&self.mysql_user, "MYSQL_USER", &mut missing);
        let password = required(&self.mysql_password, "MYSQL_PASSWORD", &mut missing);
        let database = required(&self.mysql_database, "MYSQL_DATABASE", &mut missing);

        if !missing.is_empty() {
            return Err(ConfigurationError::Missing(missing));
        }

        Ok(DatabaseSettings {
            host,
            port: parse_port("MYSQL_PORT", &port)?,
            user,
            password,
            database,
        })
    }

    /// Validate the mail group.
    pub fn mail(&self) -> Result<MailSettings, ConfigurationError> {
        let mut missing = Vec::new();
        let service = required(&self.smtp_service, "SMTP_SERVICE", &mut missing);
        let require_tls = required(&self.smtp_require_tls, "SMTP_REQUIRE_TLS", &mut missing);
        let user = required(&self.mail_user, "MAIL_USER", &mut missing);
        let password = required(&self.mail_password, "MAIL_PASSWORD", &mut missing);
        let from = required(&self.mail_from, "MAIL_FROM", &mut missing);
        let to = required(&self.mail_to, "MAIL_TO", &mut missing);

        if !missing.is_empty() {
            return Err(ConfigurationError::Missing(missing));
        }

        Ok(MailSettings {
            service,
            require_tls: require_tls == "true",
            user,
            password,
            from,
            to,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn required(value: &Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match non_blank(value) {
        Some(v) => v.to_string(),
        None => {
            missing.push(key);
            String::new()
        }
    }
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::Invalid {
            key,
            reason: "expected a port number".into(),
        })
}

/// Where connectors read their settings from at initialization time.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// Re-read `.env`, `config.toml` and the environment on every snapshot.
    Environment,
    /// Use a fixed set of settings.
    Fixed(Settings),
}

impl SettingsSource {
    pub fn snapshot(&self) -> Result<Settings, ConfigurationError> {
        match self {
            Self::Environment => Ok(Settings::load()?),
            Self::Fixed(settings) => Ok(settings.clone()),
        }
    }
}

/// Validated MySQL connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

/// Validated SMTP settings.
#[derive(Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Well-known service name (`gmail`, `outlook`, ...) or an SMTP relay host.
    pub service: String,
    pub require_tls: bool,
    pub user: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("service", &self.service)
            .field("require_tls", &self.require_tls)
            .finish_non_exhaustive()
    }
}
