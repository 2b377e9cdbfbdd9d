//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Primary key already taken. Raised from the store's constraint error
    /// kind, never from message text.
    #[error("{entity_type} already exists: {id}")]
    Duplicate {
        entity_type: &'static str,
        id: String,
    },

    /// Database operation failed - includes operation name for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored row could not be mapped back to a domain value.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn duplicate(entity_type: &'static str, id: impl ToString) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Failures from the chat platform.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    #[error("Role lookup failed: {0}")]
    RoleLookup(String),
}

/// Failures talking to remote HTTP services.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
