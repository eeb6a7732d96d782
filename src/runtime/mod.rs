//! Runtime abstraction for system operations.
//!
//! Everything the SDK needs from the host (environment, files, the clock
//! and sleeping) goes through [`Runtime`], so tests can inject a mock or a
//! virtual clock instead of touching the real system.
//!
//! # Structure
//!
//! - `env` - Environment variables and well-known directories
//! - `fs` - File system operations used by config loading and downloads
//! - `clock` - Monotonic time and blocking sleeps

mod clock;
mod env;
mod fs;

use std::env as std_env;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> std::result::Result<String, std_env::VarError>;
    fn config_dir(&self) -> Option<PathBuf>;

    // File System
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;

    // Time
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> std::result::Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn now(&self) -> Instant {
        self.now_impl()
    }

    fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration)
    }
}
