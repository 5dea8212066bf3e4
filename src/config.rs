//! Runtime configuration loaded from the environment
//!
//! A `.env` file in the working directory is honoured. Configuration is
//! built once at start-up and passed explicitly to the components that need
//! it.

use crate::{
    constants::{DEFAULT_FETCH_CONCURRENCY, REQUEST_TIMEOUT_SECS},
    error::ConfigError,
};
use std::collections::HashMap;
use std::time::Duration;

pub const ENV_EMAIL_USER: &str = "EMAIL_USER";
pub const ENV_EMAIL_PASS: &str = "EMAIL_PASS";
pub const ENV_EMAIL_RECEIVER: &str = "EMAIL_RECEIVER";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "MARKET_REQUEST_TIMEOUT_SECS";
pub const ENV_FETCH_CONCURRENCY: &str = "MARKET_FETCH_CONCURRENCY";

/// Default SMTP relay (implicit TLS)
pub const DEFAULT_SMTP_HOST: &str = "smtp.qq.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Settings for data resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Timeout applied to every provider request
    pub request_timeout: Duration,
    /// Raw metrics resolved at the same time
    pub concurrency: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }
}

impl ResolverConfig {
    /// Loads overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env_vars(&[ENV_REQUEST_TIMEOUT_SECS, ENV_FETCH_CONCURRENCY])?)
    }

    /// Loads overrides from a variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(secs) = optional(vars, ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = parse(ENV_REQUEST_TIMEOUT_SECS, secs)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    name: ENV_REQUEST_TIMEOUT_SECS,
                    value: "0".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(n) = optional(vars, ENV_FETCH_CONCURRENCY) {
            let n: usize = parse(ENV_FETCH_CONCURRENCY, n)?;
            config.concurrency = n.max(1);
        }

        Ok(config)
    }
}

/// SMTP credentials and addresses
#[derive(Clone, PartialEq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub receiver: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("receiver", &self.receiver)
            .finish()
    }
}

impl SmtpConfig {
    /// Loads SMTP settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env_vars(&[
            ENV_EMAIL_USER,
            ENV_EMAIL_PASS,
            ENV_EMAIL_RECEIVER,
            ENV_SMTP_HOST,
            ENV_SMTP_PORT,
        ])?)
    }

    /// Loads SMTP settings from a variable map
    ///
    /// Sender, password and receiver are required and trimmed.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let sender = required(vars, ENV_EMAIL_USER)?;
        let password = required(vars, ENV_EMAIL_PASS)?;
        let receiver = required(vars, ENV_EMAIL_RECEIVER)?;

        let host = optional(vars, ENV_SMTP_HOST)
            .unwrap_or(DEFAULT_SMTP_HOST)
            .to_string();
        let port = match optional(vars, ENV_SMTP_PORT) {
            Some(p) => parse(ENV_SMTP_PORT, p)?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host,
            port,
            sender,
            password,
            receiver,
        })
    }
}

/// Reads the named variables, skipping unset ones
///
/// Other variables are never touched, so unrelated non-UTF-8 entries in the
/// environment are harmless.
fn env_vars(names: &[&'static str]) -> Result<HashMap<String, String>, ConfigError> {
    let mut vars = HashMap::new();
    for &name in names {
        match std::env::var(name) {
            Ok(value) => {
                vars.insert(name.to_string(), value);
            }
            Err(std::env::VarError::NotPresent) => {}
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::Invalid {
                    name,
                    value: "<not UTF-8>".to_string(),
                });
            }
        }
    }
    Ok(vars)
}

fn optional<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn required(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    optional(vars, name)
        .map(str::to_string)
        .ok_or(ConfigError::Missing(name))
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolver_defaults() {
        let config = ResolverConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_resolver_overrides() {
        let config = ResolverConfig::from_vars(&vars(&[
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_FETCH_CONCURRENCY, "4"),
        ]))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.concurrency, 4);

        assert!(ResolverConfig::from_vars(&vars(&[(ENV_REQUEST_TIMEOUT_SECS, "0")])).is_err());
        assert!(ResolverConfig::from_vars(&vars(&[(ENV_FETCH_CONCURRENCY, "many")])).is_err());
    }

    #[test]
    fn test_smtp_requires_credentials() {
        let err = SmtpConfig::from_vars(&vars(&[
            (ENV_EMAIL_USER, "me@example.com"),
            (ENV_EMAIL_PASS, "   "),
            (ENV_EMAIL_RECEIVER, "you@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_EMAIL_PASS)));
    }

    #[test]
    fn test_smtp_trims_and_defaults() {
        let config = SmtpConfig::from_vars(&vars(&[
            (ENV_EMAIL_USER, " me@example.com "),
            (ENV_EMAIL_PASS, "secret\n"),
            (ENV_EMAIL_RECEIVER, "you@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.sender, "me@example.com");
        assert_eq!(config.password, "secret");
        assert_eq!(config.host, DEFAULT_SMTP_HOST);
        assert_eq!(config.port, 465);
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_ignores_unrelated_non_utf8_variables() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var(
            "MARKET_SNAPSHOT_UNRELATED_BYTES",
            OsStr::from_bytes(b"\xff\xfe"),
        );
        let result = ResolverConfig::from_env();
        std::env::remove_var("MARKET_SNAPSHOT_UNRELATED_BYTES");

        assert!(result.is_ok());
    }
}
