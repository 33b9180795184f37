//! Ledger error types.

use cashdesk_domain::{DomainError, MemberId};
use cashdesk_store::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Ledger-level errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Operation called before `initialize` (or after `shutdown`)
    #[error("Ledger is not initialized")]
    NotInitialized,

    /// `initialize` called twice
    #[error("Ledger is already initialized")]
    AlreadyInitialized,

    /// Malformed input (empty name, negative amount)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Last name already registered
    #[error("A member with last name '{0}' already exists")]
    DuplicateName(String),

    /// Member does not exist
    #[error("Member not found: {0}")]
    NotFound(MemberId),

    /// Join attempted while a membership is active
    #[error("Member {0} already has an active membership")]
    AlreadyMember(MemberId),

    /// Operation requires an active membership
    #[error("Member {0} has no active membership")]
    NotMember(MemberId),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        LedgerError::InvalidArgument(err.to_string())
    }
}

/// Error kinds, for front ends that map failures onto their own surface
/// (exit codes, HTTP statuses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Ledger not initialized
    NotInitialized,
    /// `initialize` called on a running ledger
    AlreadyInitialized,
    /// Rejected input: empty or overlong name, negative amount
    InvalidArgument,
    /// Last name already taken
    DuplicateName,
    /// No member with the given id
    NotFound,
    /// Member already has an active membership
    AlreadyMember,
    /// Member has no active membership
    NotMember,
    /// Store failure (unavailable, constraint violation)
    Store,
    /// Invalid configuration
    Config,
}

impl LedgerError {
    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotInitialized => ErrorKind::NotInitialized,
            LedgerError::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            LedgerError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            LedgerError::DuplicateName(_) => ErrorKind::DuplicateName,
            LedgerError::NotFound(_) => ErrorKind::NotFound,
            LedgerError::AlreadyMember(_) => ErrorKind::AlreadyMember,
            LedgerError::NotMember(_) => ErrorKind::NotMember,
            LedgerError::Store(_) => ErrorKind::Store,
            LedgerError::Config(_) => ErrorKind::Config,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotInitialized => "not_initialized",
            ErrorKind::AlreadyInitialized => "already_initialized",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::DuplicateName => "duplicate_name",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyMember => "already_member",
            ErrorKind::NotMember => "not_member",
            ErrorKind::Store => "store",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
