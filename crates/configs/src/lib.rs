//! # configs
//!
//! Layered runtime settings. Sources, lowest precedence first:
//! built-in defaults, `config/default.toml`, `config/{MEMORIAL_ENV}.toml`,
//! then `MEMORIAL__SECTION__KEY` environment variables (a `.env` file is
//! loaded into the environment first).

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;

const ENV_PREFIX: &str = "MEMORIAL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub lock: LockSettings,
    pub pagination: PaginationSettings,
    pub limits: LimitSettings,
    pub passcode: PasscodeSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    pub capacity: usize,
    pub idle_ttl_secs: u64,
    /// `0` disables the bound.
    pub acquire_timeout_ms: u64,
    pub sweep_interval: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            idle_ttl_secs: 600,
            acquire_timeout_ms: 5_000,
            sweep_interval: 1_024,
        }
    }
}

impl LockSettings {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        (self.acquire_timeout_ms > 0).then(|| Duration::from_millis(self.acquire_timeout_ms))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub name_max: usize,
    pub content_max: usize,
    pub passcode_min: usize,
    pub passcode_max: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            name_max: 30,
            content_max: 1_000,
            passcode_min: 4,
            passcode_max: 32,
        }
    }
}

/// Argon2 cost parameters. Memory is in KiB.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PasscodeSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub pepper: Option<SecretString>,
}

impl Default for PasscodeSettings {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
            pepper: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Loads from `./config` and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"))
    }

    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
        }

        let mut builder = Config::builder()
            .add_source(File::from(dir.join("default")).required(false));
        if let Ok(env) = std::env::var(format!("{ENV_PREFIX}_ENV")) {
            builder = builder.add_source(File::from(dir.join(&env)).required(false));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses a TOML document on top of the defaults, without touching the
    /// filesystem or environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.capacity == 0 {
            return Err(ConfigError::Invalid("lock.capacity must be positive".into()));
        }
        if self.lock.sweep_interval == 0 {
            return Err(ConfigError::Invalid("lock.sweep_interval must be positive".into()));
        }
        let page = &self.pagination;
        if page.max_page_size == 0 || page.default_page_size == 0 {
            return Err(ConfigError::Invalid("page sizes must be positive".into()));
        }
        if page.default_page_size > page.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_page_size ({}) exceeds max_page_size ({})",
                page.default_page_size, page.max_page_size
            )));
        }
        let limits = &self.limits;
        if limits.passcode_min == 0 || limits.passcode_min > limits.passcode_max {
            return Err(ConfigError::Invalid(format!(
                "passcode length range {}..={} is empty",
                limits.passcode_min, limits.passcode_max
            )));
        }
        Ok(())
    }
}
