//! Ledger configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{LedgerError, LedgerResult};
use cashdesk_domain::PersonName;
use std::env;

// =============================================================================
// Configuration
// =============================================================================

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum length of first and last names (at most 100)
    pub max_name_length: usize,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// - `CASHDESK_ENV`: test, development (default), production
    /// - `CASHDESK_MAX_NAME_LENGTH`: 1..=100 (default 100)
    pub fn from_env() -> LedgerResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let max_name_length = Self::load_max_name_length()?;

        Ok(Self {
            max_name_length,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            max_name_length: PersonName::MAX_LENGTH,
            environment: Environment::Test,
        }
    }

    fn load_environment() -> LedgerResult<Environment> {
        let env_str = env::var("CASHDESK_ENV").unwrap_or_else(|_| "development".to_string());
        parse_environment(&env_str)
    }

    fn load_max_name_length() -> LedgerResult<usize> {
        match env::var("CASHDESK_MAX_NAME_LENGTH") {
            Ok(val) => parse_max_name_length(&val),
            Err(_) => Ok(PersonName::MAX_LENGTH),
        }
    }
}

fn parse_environment(value: &str) -> LedgerResult<Environment> {
    match value.to_lowercase().as_str() {
        "test" => Ok(Environment::Test),
        "development" | "dev" => Ok(Environment::Development),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(LedgerError::Config(format!(
            "Invalid CASHDESK_ENV: {}. Expected: test, development, production",
            other
        ))),
    }
}

fn parse_max_name_length(value: &str) -> LedgerResult<usize> {
    let length = value.trim().parse::<usize>().map_err(|_| {
        LedgerError::Config(format!("Invalid CASHDESK_MAX_NAME_LENGTH value: {}", value))
    })?;

    if length == 0 || length > PersonName::MAX_LENGTH {
        return Err(LedgerError::Config(format!(
            "CASHDESK_MAX_NAME_LENGTH must be between 1 and {}, got {}",
            PersonName::MAX_LENGTH,
            length
        )));
    }

    Ok(length)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_name_length: PersonName::MAX_LENGTH,
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
