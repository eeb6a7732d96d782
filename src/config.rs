//! Client configuration.
//!
//! Values come from `TENABLEIO_*` environment variables; a TOML file (the
//! `[tenable_io]` table of `$TENABLEIO_CONFIG_FILE`, or
//! `<config dir>/tenable_io/config.toml`) overrides them key by key.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, debug};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::http::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_SLEEP_MS, RetryPolicy};
use crate::logging::{LogDestination, LogSettings, parse_level};
use crate::runtime::Runtime;

pub const DEFAULT_ENDPOINT: &str = "https://cloud.tenable.com/";

/// Default polling interval in seconds.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 10;

pub const ENV_CONFIG_FILE: &str = "TENABLEIO_CONFIG_FILE";
pub const ENV_ENDPOINT: &str = "TENABLEIO_ENDPOINT";
pub const ENV_ACCESS_KEY: &str = "TENABLEIO_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "TENABLEIO_SECRET_KEY";
pub const ENV_IMPERSONATE: &str = "TENABLEIO_IMPERSONATE";
pub const ENV_LOGGING_LEVEL: &str = "TENABLEIO_LOGGING_LEVEL";
pub const ENV_LOG_FILE: &str = "TENABLEIO_LOG_FILE";
pub const ENV_POLLING_INTERVAL: &str = "TENABLEIO_POLLING_INTERVAL";
pub const ENV_MAX_RETRIES: &str = "TENABLEIO_MAX_RETRIES";
pub const ENV_RETRY_SLEEP_MILLISECONDS: &str = "TENABLEIO_RETRY_SLEEP_MILLISECONDS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub impersonate: Option<String>,
    pub logging_level: String,
    pub log_file: Option<PathBuf>,
    /// Seconds between status checks.
    pub polling_interval: u64,
    /// Clamped to 5 when turned into a [`RetryPolicy`].
    pub max_retries: u32,
    pub retry_sleep_milliseconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: None,
            secret_key: None,
            impersonate: None,
            logging_level: "warn".to_string(),
            log_file: None,
            polling_interval: DEFAULT_POLLING_INTERVAL_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_sleep_milliseconds: DEFAULT_RETRY_SLEEP_MS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tenable_io: ConfigSection,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigSection {
    endpoint: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    impersonate: Option<String>,
    logging_level: Option<String>,
    log_file: Option<PathBuf>,
    polling_interval: Option<u64>,
    max_retries: Option<u32>,
    retry_sleep_milliseconds: Option<u64>,
}

impl Config {
    /// Loads from the environment, then the default config file if present.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R) -> Result<Self> {
        let path = Self::default_file(runtime);
        Self::load_from(runtime, path.as_deref())
    }

    /// Loads from the environment, then `path` if given and present.
    pub fn load_from<R: Runtime + ?Sized>(runtime: &R, path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(runtime)?;

        if let Some(path) = path {
            if runtime.exists(path) {
                debug!("Loading config file {:?}", path);
                let text = runtime.read_to_string(path)?;
                config.apply_toml(&text)?;
            } else {
                debug!("Config file {:?} not found, using environment only", path);
            }
        }

        Ok(config)
    }

    /// `$TENABLEIO_CONFIG_FILE`, else `<config dir>/tenable_io/config.toml`.
    pub fn default_file<R: Runtime + ?Sized>(runtime: &R) -> Option<PathBuf> {
        if let Ok(path) = runtime.env_var(ENV_CONFIG_FILE) {
            return Some(PathBuf::from(path));
        }
        runtime
            .config_dir()
            .map(|dir| dir.join("tenable_io").join("config.toml"))
    }

    fn apply_env<R: Runtime + ?Sized>(&mut self, runtime: &R) -> Result<()> {
        let var = |key: &str| runtime.env_var(key).ok().filter(|v| !v.is_empty());

        if let Some(endpoint) = var(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(key) = var(ENV_ACCESS_KEY) {
            self.access_key = Some(key);
        }
        if let Some(key) = var(ENV_SECRET_KEY) {
            self.secret_key = Some(key);
        }
        if let Some(user) = var(ENV_IMPERSONATE) {
            self.impersonate = Some(user);
        }
        if let Some(level) = var(ENV_LOGGING_LEVEL) {
            self.logging_level = level;
        }
        if let Some(path) = var(ENV_LOG_FILE) {
            self.log_file = Some(PathBuf::from(path));
        }
        if let Some(value) = var(ENV_POLLING_INTERVAL) {
            self.polling_interval = parse_number(ENV_POLLING_INTERVAL, &value)?;
        }
        if let Some(value) = var(ENV_MAX_RETRIES) {
            self.max_retries = parse_number(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = var(ENV_RETRY_SLEEP_MILLISECONDS) {
            self.retry_sleep_milliseconds = parse_number(ENV_RETRY_SLEEP_MILLISECONDS, &value)?;
        }

        Ok(())
    }

    /// Overrides fields with the keys present in a TOML document.
    pub fn apply_toml(&mut self, text: &str) -> Result<()> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| Error::Config(format!("invalid config file: {}", e)))?;
        let section = file.tenable_io;

        if let Some(endpoint) = section.endpoint {
            self.endpoint = endpoint;
        }
        if section.access_key.is_some() {
            self.access_key = section.access_key;
        }
        if section.secret_key.is_some() {
            self.secret_key = section.secret_key;
        }
        if section.impersonate.is_some() {
            self.impersonate = section.impersonate;
        }
        if let Some(level) = section.logging_level {
            self.logging_level = level;
        }
        if section.log_file.is_some() {
            self.log_file = section.log_file;
        }
        if let Some(interval) = section.polling_interval {
            self.polling_interval = interval;
        }
        if let Some(retries) = section.max_retries {
            self.max_retries = retries;
        }
        if let Some(sleep) = section.retry_sleep_milliseconds {
            self.retry_sleep_milliseconds = sleep;
        }

        Ok(())
    }

    /// Access and secret key, or a config error naming what is missing.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access), Some(secret)) => Ok((access, secret)),
            (None, _) => Err(Error::Config(format!(
                "missing access key (set {})",
                ENV_ACCESS_KEY
            ))),
            (_, None) => Err(Error::Config(format!(
                "missing secret key (set {})",
                ENV_SECRET_KEY
            ))),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_sleep_milliseconds),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval)
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        parse_level(&self.logging_level)
    }

    pub fn log_settings(&self) -> Result<LogSettings> {
        Ok(LogSettings {
            level: self.log_level()?,
            destination: match &self.log_file {
                Some(path) => LogDestination::File(path.clone()),
                None => LogDestination::Stderr,
            },
        })
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::collections::HashMap;

    /// MockRuntime answering env lookups from `vars`.
    fn runtime_with_env(vars: &[(&str, &str)]) -> MockRuntime {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().returning(move |key| {
            vars.get(key)
                .cloned()
                .ok_or(std::env::VarError::NotPresent)
        });
        runtime
    }

    #[test]
    fn test_defaults_without_environment() {
        let runtime = runtime_with_env(&[]);
        let config = Config::load_from(&runtime, None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_environment_values() {
        let runtime = runtime_with_env(&[
            (ENV_ENDPOINT, "https://tio.example.com/"),
            (ENV_ACCESS_KEY, "ak"),
            (ENV_SECRET_KEY, "sk"),
            (ENV_POLLING_INTERVAL, "3"),
            (ENV_MAX_RETRIES, "9"),
            (ENV_RETRY_SLEEP_MILLISECONDS, "250"),
            (ENV_LOGGING_LEVEL, "DEBUG"),
        ]);

        let config = Config::load_from(&runtime, None).unwrap();

        assert_eq!(config.endpoint, "https://tio.example.com/");
        assert_eq!(config.credentials().unwrap(), ("ak", "sk"));
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.max_retries, 9);
        // Clamped when turned into a policy
        assert_eq!(config.retry_policy().max_retries(), 5);
        assert_eq!(
            config.retry_policy().base_sleep(),
            Duration::from_millis(250)
        );
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_number_in_environment() {
        let runtime = runtime_with_env(&[(ENV_MAX_RETRIES, "lots")]);
        let err = Config::load_from(&runtime, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(ENV_MAX_RETRIES));
    }

    #[test]
    fn test_file_overrides_environment() {
        let mut runtime = runtime_with_env(&[
            (ENV_ACCESS_KEY, "env-ak"),
            (ENV_SECRET_KEY, "env-sk"),
            (ENV_MAX_RETRIES, "1"),
        ]);
        let path = PathBuf::from("/etc/tio/config.toml");
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| {
                Ok(r#"
[tenable_io]
access_key = "file-ak"
max_retries = 4
polling_interval = 30
"#
                .to_string())
            });

        let config = Config::load_from(&runtime, Some(&path)).unwrap();

        assert_eq!(config.access_key.as_deref(), Some("file-ak"));
        assert_eq!(config.secret_key.as_deref(), Some("env-sk"));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.polling_interval, 30);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let mut runtime = runtime_with_env(&[]);
        runtime.expect_exists().returning(|_| false);

        let config =
            Config::load_from(&runtime, Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let mut config = Config::default();
        let err = config.apply_toml("[tenable_io\nendpoint = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_default_file_location() {
        let mut runtime = runtime_with_env(&[]);
        runtime
            .expect_config_dir()
            .returning(|| Some(PathBuf::from("/home/user/.config")));

        assert_eq!(
            Config::default_file(&runtime),
            Some(PathBuf::from("/home/user/.config/tenable_io/config.toml"))
        );

        let runtime = runtime_with_env(&[(ENV_CONFIG_FILE, "/tmp/tio.toml")]);
        assert_eq!(
            Config::default_file(&runtime),
            Some(PathBuf::from("/tmp/tio.toml"))
        );
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config {
            access_key: Some("ak".to_string()),
            ..Config::default()
        };
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains(ENV_SECRET_KEY));
    }

    #[test]
    fn test_log_settings_destination() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/log/tio.log")),
            logging_level: "warning".to_string(),
            ..Config::default()
        };
        let settings = config.log_settings().unwrap();
        assert_eq!(settings.level, LevelFilter::Warn);
        assert_eq!(
            settings.destination,
            LogDestination::File(PathBuf::from("/var/log/tio.log"))
        );
    }
}
