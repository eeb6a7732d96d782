//! Logger setup for binaries embedding the SDK.
//!
//! The library itself only emits through the `log` facade. A host decides
//! once where records go and at which level by calling [`init`].

use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stderr,
    Stdout,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub destination: LogDestination,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            destination: LogDestination::Stderr,
        }
    }
}

/// Parses a level name. Accepts the `log` names plus `warning`,
/// `critical` and `fatal`, case-insensitively.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    let level = match name.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => LevelFilter::Off,
        "critical" | "fatal" | "error" => LevelFilter::Error,
        "warning" | "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" | "notset" => LevelFilter::Trace,
        other => {
            return Err(Error::Config(format!("unknown logging level '{}'", other)));
        }
    };
    Ok(level)
}

/// Installs an `env_logger` built from `settings`. `RUST_LOG`, when set,
/// refines the configured level per module.
pub fn init(settings: &LogSettings) -> Result<()> {
    builder(settings, Env::default())?
        .try_init()
        .map_err(|e| Error::Config(format!("logger already initialised: {}", e)))
}

fn builder(settings: &LogSettings, env: Env<'_>) -> Result<Builder> {
    let mut builder = Builder::new();
    builder.filter_level(settings.level);
    builder.parse_env(env);

    match &settings.destination {
        LogDestination::Stderr => {
            builder.target(Target::Stderr);
        }
        LogDestination::Stdout => {
            builder.target(Target::Stdout);
        }
        LogDestination::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_names() {
        assert_eq!(parse_level("WARNING").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("Critical").unwrap(), LevelFilter::Error);
        assert_eq!(parse_level(" debug ").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("notset").unwrap(), LevelFilter::Trace);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
    }

    #[test]
    fn test_parse_level_unknown() {
        assert!(matches!(parse_level("loud"), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_settings() {
        let settings = LogSettings::default();
        assert_eq!(settings.level, LevelFilter::Warn);
        assert_eq!(settings.destination, LogDestination::Stderr);
    }

    #[test]
    fn test_builder_uses_configured_level() {
        let settings = LogSettings {
            level: LevelFilter::Info,
            destination: LogDestination::Stdout,
        };
        let logger = builder(&settings, Env::new().filter("TIO_TEST_LOG_UNSET"))
            .unwrap()
            .build();
        assert_eq!(logger.filter(), LevelFilter::Info);
    }

    #[test]
    fn test_builder_env_filters_refine_level() {
        let env = Env::new().filter_or("TIO_TEST_LOG_UNSET", "tenable_io=trace");
        let logger = builder(&LogSettings::default(), env).unwrap().build();
        assert_eq!(logger.filter(), LevelFilter::Trace);
    }

    #[test]
    fn test_builder_appends_to_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tio.log");
        let settings = LogSettings {
            level: LevelFilter::Debug,
            destination: LogDestination::File(path.clone()),
        };
        builder(&settings, Env::new().filter("TIO_TEST_LOG_UNSET")).unwrap();
        assert!(path.exists());
    }
}
