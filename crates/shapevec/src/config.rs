//! Process-wide configuration.
//!
//! The configuration is read once, on first use, from the environment:
//!
//! - `SHAPEVEC_MAX_BITS`: width of the `Max` shape in bits, a power of two
//!   between 64 and 2048. Defaults to the widest width the CPU supports.
//! - `SHAPEVEC_BACKEND`: `auto` (default) or `scalar`.
//!
//! A program can instead call [`init`] before touching any vector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable overriding the `Max` shape width.
pub const MAX_BITS_VAR: &str = "SHAPEVEC_MAX_BITS";

/// Environment variable selecting the backend.
pub const BACKEND_VAR: &str = "SHAPEVEC_BACKEND";

/// Smallest accepted `Max` width.
pub const MIN_MAX_BITS: u32 = 64;

/// Largest accepted `Max` width.
pub const MAX_MAX_BITS: u32 = 2048;

/// Errors in configuration values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_bits` outside the accepted range or not a power of two.
    #[error("max vector width {0} must be a power of two between 64 and 2048")]
    InvalidMaxBits(u32),

    /// Unknown backend name.
    #[error("unknown backend `{0}`, expected `auto` or `scalar`")]
    UnknownBackend(String),

    /// An environment variable that does not parse.
    #[error("cannot parse {var}={value}")]
    Unparsable {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// [`init`] called after the configuration was fixed.
    #[error("configuration is already initialized")]
    AlreadyInitialized,
}

/// Which execution backend to install by default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// The best backend the host supports.
    #[default]
    Auto,
    /// Always the scalar fallbacks.
    Scalar,
}

impl BackendChoice {
    /// Get the name of this choice.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BackendChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "scalar" => Ok(Self::Scalar),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Library configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Width of the `Max` shape; `None` uses the platform's widest.
    pub max_bits: Option<u32>,
    /// Backend to install when none was installed explicitly.
    pub backend: BackendChoice,
}

impl Config {
    /// Set the `Max` shape width.
    #[must_use]
    pub fn with_max_bits(mut self, bits: u32) -> Self {
        self.max_bits = Some(bits);
        self
    }

    /// Set the backend choice.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendChoice) -> Self {
        self.backend = backend;
        self
    }

    /// Check every value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bits) = self.max_bits {
            if !bits.is_power_of_two() || !(MIN_MAX_BITS..=MAX_MAX_BITS).contains(&bits) {
                return Err(ConfigError::InvalidMaxBits(bits));
            }
        }
        Ok(())
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(MAX_BITS_VAR) {
            let bits = raw.trim().parse().map_err(|_| ConfigError::Unparsable {
                var: MAX_BITS_VAR,
                value: raw.clone(),
            })?;
            config.max_bits = Some(bits);
        }
        if let Some(raw) = lookup(BACKEND_VAR) {
            config.backend = raw.parse()?;
        }
        config.validate()?;
        Ok(config)
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install `config` as the process configuration.
///
/// Fails if the configuration is invalid or was already fixed, either by an
/// earlier call or by any vector operation having run.
pub fn init(config: Config) -> crate::Result<()> {
    config.validate()?;
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(())
}

/// The active configuration, read from the environment on first call.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(|| match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "ignoring invalid shapevec environment configuration");
            Config::default()
        }
    })
}
