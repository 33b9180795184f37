//! Value Objects for the CashDesk Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object and entity validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Name is empty or exceeds the maximum length
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Deposit amounts cannot be negative
    #[error("Negative amount: {0}")]
    NegativeAmount(Decimal),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

// =============================================================================
// PersonName
// =============================================================================

/// First or last name of a member
///
/// # Invariants
/// - Must be non-empty
/// - At most `max_length` characters (never more than [`PersonName::MAX_LENGTH`])
///
/// Names are kept verbatim: no trimming, no case folding. Uniqueness of last
/// names is an exact, case-sensitive comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Column limit for first and last names
    pub const MAX_LENGTH: usize = 100;

    /// Create a name with the default length limit
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the name is empty or too long
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_max_length(value, Self::MAX_LENGTH)
    }

    /// Create a name with a custom (tighter) length limit
    ///
    /// A `max_length` above [`PersonName::MAX_LENGTH`] is clamped to it.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the name is empty or too long
    pub fn with_max_length(value: impl Into<String>, max_length: usize) -> Result<Self, DomainError> {
        let value = value.into();
        let limit = max_length.min(Self::MAX_LENGTH);

        if value.is_empty() {
            return Err(DomainError::InvalidName("Name must not be empty".to_string()));
        }

        let length = value.chars().count();
        if length > limit {
            return Err(DomainError::InvalidName(format!(
                "Name has {} characters, maximum is {}",
                length, limit
            )));
        }

        Ok(Self(value))
    }

    /// Borrow the name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Amount
// =============================================================================

/// Amount represents a non-negative monetary value
///
/// # Invariants
/// - Must be >= 0 (zero deposits are accepted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount with validation
    ///
    /// # Errors
    /// Returns `DomainError::NegativeAmount` if value < 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
