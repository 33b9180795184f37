//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (member, membership, deposit)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Unique constraint violation
    #[error("Duplicate entity: {entity_type} with key {key}")]
    Duplicate {
        /// Type of entity
        entity_type: String,
        /// Value of the unique key
        key: String,
    },

    /// Referential integrity violation (missing parent, remaining children)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Store cannot serve requests (closed, lock poisoned)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(entity_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            key: key.into(),
        }
    }

    /// Create a constraint error
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint(message.into())
    }
}
