//! Configuration loading from environment variables and `.env` files.
//!
//! [`Settings`] holds the values handlers read on every request. It is a
//! cheap handle: clones share the same live values, so the enrollment cap can
//! be changed while the server runs.

use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Environment variable holding the enrollment cap.
pub const MAX_STUDENTS_ENV: &str = "MAX_STUDENTS_PER_COURSE";
/// Environment variable holding the bind host.
pub const HOST_ENV: &str = "ENROLLMENT_HOST";
/// Environment variable holding the bind port.
pub const PORT_ENV: &str = "ENROLLMENT_PORT";
/// Environment variable holding the per-request time budget in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "ENROLLMENT_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_MAX_STUDENTS_PER_COURSE: usize = 20;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Load environment variables from a `.env` file if it exists.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Get a required environment variable.
pub fn get_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

/// Get an optional environment variable with a default value.
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse an environment variable.
pub fn get_env_parsed<T: FromStr>(key: &str) -> Result<T, ConfigError> {
    let value = get_env(key)?;
    value.parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
}

/// Get and parse an environment variable, falling back to `default` only when
/// the variable is unset. A present but unparsable value is an error.
pub fn get_env_parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match get_env_parsed(key) {
        Err(ConfigError::Missing(_)) => Ok(default),
        other => other,
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Environment variable is not set.
    Missing(String),
    /// Environment variable value is invalid.
    Invalid { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => {
                write!(f, "Missing required environment variable '{}'", key)
            }
            ConfigError::Invalid { key, value } => {
                write!(
                    f,
                    "Invalid value '{}' for environment variable '{}' (failed to parse as expected type)",
                    value, key
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Runtime settings shared by every request.
#[derive(Debug, Clone)]
pub struct Settings {
    max_students_per_course: Arc<AtomicUsize>,
}

impl Settings {
    pub fn new(max_students_per_course: usize) -> Self {
        Self {
            max_students_per_course: Arc::new(AtomicUsize::new(max_students_per_course)),
        }
    }

    /// Reads `MAX_STUDENTS_PER_COURSE`, defaulting to
    /// [`DEFAULT_MAX_STUDENTS_PER_COURSE`] when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max = get_env_parsed_or(MAX_STUDENTS_ENV, DEFAULT_MAX_STUDENTS_PER_COURSE)?;
        Ok(Self::new(max))
    }

    /// The current enrollment cap.
    pub fn max_students_per_course(&self) -> usize {
        self.max_students_per_course.load(Ordering::Acquire)
    }

    /// Changes the enrollment cap for every holder of this handle.
    pub fn set_max_students_per_course(&self, max: usize) {
        self.max_students_per_course.store(max, Ordering::Release);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STUDENTS_PER_COURSE)
    }
}

/// Where the HTTP server binds and how long a request may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = get_env_parsed_or(REQUEST_TIMEOUT_ENV, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        Ok(Self {
            host: get_env_or(HOST_ENV, DEFAULT_HOST),
            port: get_env_parsed_or(PORT_ENV, DEFAULT_PORT)?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
