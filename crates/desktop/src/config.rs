//! Session configuration (defaults + environment overrides).

use thiserror::Error;

use tally_core::{DEFAULT_FIELD_MAX_LEN, TaxRate};
use tally_grades::STANDARD_CLASSES;

pub const TAX_RATE_ENV: &str = "TALLY_TAX_RATE";
pub const CLASSES_ENV: &str = "TALLY_CLASSES";
pub const FIELD_MAX_LEN_ENV: &str = "TALLY_FIELD_MAX_LEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid tax rate {value:?} (expected a decimal fraction such as 0.0825)")]
    TaxRate { var: &'static str, value: String },
    #[error("{var}: invalid field length {value:?} (expected a positive integer)")]
    FieldMaxLen { var: &'static str, value: String },
    #[error("{var}: class list is empty")]
    NoClasses { var: &'static str },
}

/// Everything a [`Session`](crate::Session) needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub tax: TaxRate,
    pub classes: Vec<String>,
    pub field_max_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tax: TaxRate::NONE,
            classes: STANDARD_CLASSES.iter().map(|c| c.to_string()).collect(),
            field_max_len: DEFAULT_FIELD_MAX_LEN,
        }
    }
}

impl SessionConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through `lookup`; unset or blank variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(TAX_RATE_ENV) {
            config.tax = raw.parse().map_err(|_| ConfigError::TaxRate {
                var: TAX_RATE_ENV,
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = get(CLASSES_ENV) {
            let classes: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            if classes.is_empty() {
                return Err(ConfigError::NoClasses { var: CLASSES_ENV });
            }
            config.classes = classes;
        }

        if let Some(raw) = get(FIELD_MAX_LEN_ENV) {
            config.field_max_len = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::FieldMaxLen {
                    var: FIELD_MAX_LEN_ENV,
                    value: raw.clone(),
                })?;
        }

        tracing::debug!(
            tax = %config.tax,
            classes = config.classes.len(),
            field_max_len = config.field_max_len,
            "session config loaded"
        );
        Ok(config)
    }
}
