//! Config for the engine behaviors
//!
//! Configuration can be created programmatically using [`Configuration::new()`] and the `with_*`
//! setters, or by reading environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! All values are optional. Flags are case-insensitive: set them to `"true"` to enable.
//! Values that cannot be parsed are ignored (with a warning) and the default is kept.
//!
//! - `ENGINE_LOG`: Enable logging to a file (default: `false`)
//! - `ENGINE_LOG_DIR`: Directory receiving the log file (default: current directory)
//! - `ENGINE_K_FACTOR`: Elo K-factor (default: `32`)
//! - `ENGINE_MAX_RATING`: Ratings are capped at this value (default: `3000`)
//! - `ENGINE_BRACKET_SEED`: Seed for bracket seeding (default: unset, OS entropy)
//! - `ENGINE_SWISS_ROUNDS`: Number of Swiss rounds, `0` meaning `ceil(log2(n))` (default: `0`)

use std::{path::PathBuf, str::FromStr};

use anyhow::bail;
use tracing::warn;

use crate::rating::{K_FACTOR, MAX_RATING};

/// Configuration for engine behaviors.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub(crate) log: bool,
    pub(crate) log_dir: PathBuf,
    pub(crate) k_factor: f64,
    pub(crate) max_rating: i32,
    pub(crate) bracket_seed: Option<u64>,
    pub(crate) swiss_rounds: u32,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Logging to file is disabled.
    /// - The Elo K-factor is 32 and ratings are capped at 3000.
    /// - Brackets are seeded from operating-system entropy.
    /// - Swiss tournaments play `ceil(log2(n))` rounds.
    pub fn new() -> Self {
        Self {
            log: false,
            log_dir: PathBuf::from("."),
            k_factor: K_FACTOR,
            max_rating: MAX_RATING,
            bracket_seed: None,
            swiss_rounds: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// See the [module documentation](self) for the recognized variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: FromStr>(var: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    warn!("ignoring {var}={value:?}: not a valid value");
                    None
                }
            }
        }

        let defaults = Self::new();
        Self {
            log: lookup("ENGINE_LOG")
                .map(|val| val.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.log),
            log_dir: lookup("ENGINE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            k_factor: parse("ENGINE_K_FACTOR", lookup("ENGINE_K_FACTOR"))
                .unwrap_or(defaults.k_factor),
            max_rating: parse("ENGINE_MAX_RATING", lookup("ENGINE_MAX_RATING"))
                .unwrap_or(defaults.max_rating),
            bracket_seed: parse("ENGINE_BRACKET_SEED", lookup("ENGINE_BRACKET_SEED")),
            swiss_rounds: parse("ENGINE_SWISS_ROUNDS", lookup("ENGINE_SWISS_ROUNDS"))
                .unwrap_or(defaults.swiss_rounds),
        }
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Directory receiving the log file. Only used when logging is enabled.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Set the Elo K-factor.
    pub fn with_k_factor(mut self, value: f64) -> Self {
        self.k_factor = value;
        self
    }

    /// Set the rating cap.
    pub fn with_max_rating(mut self, value: i32) -> Self {
        self.max_rating = value;
        self
    }

    /// Seed bracket generation, making it reproducible.
    pub fn with_bracket_seed(mut self, seed: u64) -> Self {
        self.bracket_seed = Some(seed);
        self
    }

    /// Fix the number of Swiss rounds. `0` means `ceil(log2(n))`.
    pub fn with_swiss_rounds(mut self, rounds: u32) -> Self {
        self.swiss_rounds = rounds;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// When the K-factor is not a positive finite number, or when logging is enabled and the log
    /// directory does not exist.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            bail!("K-factor must be a positive number, got {}", self.k_factor);
        }
        if self.log && !self.log_dir.is_dir() {
            bail!("'{}' is not a valid log directory", self.log_dir.display());
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert!(!config.log);
        assert_eq!(config.k_factor, 32.0);
        assert_eq!(config.max_rating, 3000);
        assert_eq!(config.bracket_seed, None);
        assert_eq!(config.swiss_rounds, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_variables() {
        let config = Configuration::from_lookup(lookup(&[
            ("ENGINE_LOG", "TRUE"),
            ("ENGINE_LOG_DIR", "/tmp"),
            ("ENGINE_K_FACTOR", "24"),
            ("ENGINE_MAX_RATING", "2800"),
            ("ENGINE_BRACKET_SEED", "42"),
            ("ENGINE_SWISS_ROUNDS", " 5 "),
        ]));
        assert_eq!(
            config,
            Configuration::new()
                .with_log(true)
                .with_log_dir("/tmp")
                .with_k_factor(24.0)
                .with_max_rating(2800)
                .with_bracket_seed(42)
                .with_swiss_rounds(5)
        );
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = Configuration::from_lookup(lookup(&[
            ("ENGINE_LOG", "yes"),
            ("ENGINE_K_FACTOR", "fast"),
            ("ENGINE_BRACKET_SEED", "-1"),
        ]));
        assert_eq!(config, Configuration::new());
    }

    #[test]
    fn rejects_bad_k_factor() {
        assert!(Configuration::new().with_k_factor(0.0).validate().is_err());
        assert!(Configuration::new()
            .with_k_factor(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_missing_log_dir() {
        let config = Configuration::new()
            .with_log(true)
            .with_log_dir("/definitely/not/a/directory");
        assert!(config.validate().is_err());
    }
}
