//! Mailer configuration.
//!
//! Two layers, read at different times:
//!
//! - [`MailerConfig`] is loaded once at startup (bind address, Sentry).
//! - [`SmtpSettings`] and [`ContactSettings`] are read from the environment on
//!   every request, so rotating SMTP credentials needs no restart and a
//!   missing variable is reported on the request that needs it.
//!
//! # Environment Variables
//!
//! ## Startup
//! - `MAILER_HOST` - Bind address (default: 127.0.0.1)
//! - `MAILER_PORT` - Listen port (default: 3002)
//! - `MAILER_DRY_RUN` - When `true`, log emails instead of sending them
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Per request
//! - `SMTP_HOST` - SMTP server hostname (required)
//! - `SMTP_PORT` - SMTP port (default: 587; 465 selects implicit TLS)
//! - `SMTP_USER` - SMTP username (required)
//! - `SMTP_PASS` - SMTP password (required)
//! - `SMTP_FROM_EMAIL` - Sender address (required)
//! - `CONTACT_TO_EMAIL` - Contact form destination (default: `SMTP_FROM_EMAIL`)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SMTP configuration is incomplete: {0} is not set")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

/// Source of configuration values.
///
/// Production reads the process environment; tests supply a map.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. Empty values count as unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

/// SMTP connection settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl SmtpSettings {
    /// Read SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` naming the first missing required
    /// variable, or `InvalidEnvVar` if `SMTP_PORT` is not a port number.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let port = match env.get("SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT", e.to_string()))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host: required(env, "SMTP_HOST")?,
            port,
            username: required(env, "SMTP_USER")?,
            password: SecretString::from(required(env, "SMTP_PASS")?),
            from_address: required(env, "SMTP_FROM_EMAIL")?,
        })
    }

    /// Whether to use implicit TLS (SMTPS) rather than STARTTLS.
    #[must_use]
    pub const fn implicit_tls(&self) -> bool {
        self.port == 465
    }
}

/// Where contact form messages are delivered.
#[derive(Debug, Clone)]
pub struct ContactSettings {
    pub smtp: SmtpSettings,
    pub to_address: String,
}

impl ContactSettings {
    /// Read contact settings; the destination defaults to the sender address.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`SmtpSettings::load`].
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let smtp = SmtpSettings::load(env)?;
        let to_address = env
            .get("CONTACT_TO_EMAIL")
            .unwrap_or_else(|| smtp.from_address.clone());
        Ok(Self { smtp, to_address })
    }
}

/// Startup configuration for the mailer binary.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Log emails instead of sending them.
    pub dry_run: bool,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl MailerConfig {
    /// Load startup configuration from the environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an unparseable host or port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let env = ProcessEnv;

        let host = env
            .get("MAILER_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MAILER_HOST", e.to_string()))?;
        let port = env
            .get("MAILER_PORT")
            .unwrap_or_else(|| "3002".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MAILER_PORT", e.to_string()))?;
        let dry_run = env
            .get("MAILER_DRY_RUN")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        Ok(Self {
            host,
            port,
            dry_run,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env
                .get("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: env
                .get("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn required(env: &dyn EnvSource, key: &'static str) -> Result<String, ConfigError> {
    env.get(key).ok_or(ConfigError::MissingEnvVar(key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn full_env() -> HashMap<String, String> {
        [
            ("SMTP_HOST", "smtp.example.in"),
            ("SMTP_USER", "orders@friendsstore.in"),
            ("SMTP_PASS", "hunter2-but-longer"),
            ("SMTP_FROM_EMAIL", "orders@friendsstore.in"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_load_defaults_port() {
        let settings = SmtpSettings::load(&full_env()).unwrap();
        assert_eq!(settings.port, DEFAULT_SMTP_PORT);
        assert!(!settings.implicit_tls());
    }

    #[test]
    fn test_load_reads_port() {
        let mut env = full_env();
        env.insert("SMTP_PORT".to_string(), "465".to_string());
        let settings = SmtpSettings::load(&env).unwrap();
        assert!(settings.implicit_tls());

        env.insert("SMTP_PORT".to_string(), "smtp".to_string());
        assert!(matches!(
            SmtpSettings::load(&env),
            Err(ConfigError::InvalidEnvVar("SMTP_PORT", _))
        ));
    }

    #[test]
    fn test_each_required_variable_is_checked() {
        for key in ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "SMTP_FROM_EMAIL"] {
            let mut env = full_env();
            env.remove(key);
            let err = SmtpSettings::load(&env).unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == key));

            // Blank counts as missing.
            let mut env = full_env();
            env.insert(key.to_string(), String::new());
            assert!(SmtpSettings::load(&env).is_err());
        }
    }

    #[test]
    fn test_contact_destination_defaults_to_sender() {
        let settings = ContactSettings::load(&full_env()).unwrap();
        assert_eq!(settings.to_address, "orders@friendsstore.in");

        let mut env = full_env();
        env.insert("CONTACT_TO_EMAIL".to_string(), "owner@friendsstore.in".to_string());
        let settings = ContactSettings::load(&env).unwrap();
        assert_eq!(settings.to_address, "owner@friendsstore.in");
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = SmtpSettings::load(&full_env()).unwrap();
        let debug_output = format!("{settings:?}");
        assert!(debug_output.contains("smtp.example.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2-but-longer"));
    }
}
