//! Write collaborator
//!
//! Receives finalized transactions. Transport, retries and backoff are
//! its own business; the write service makes exactly one call per update.

use crate::transaction::OperationContainer;
use async_trait::async_trait;

/// Transport-level failure reported by a [`WriteCollaborator`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Underlying message
    pub message: String,
}

impl TransportError {
    /// Error with `message`
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Submits transactions to the backing store
#[async_trait]
pub trait WriteCollaborator: Send + Sync {
    /// Submit `operations`
    ///
    /// # Errors
    /// Any transport or server-side failure
    async fn write(&self, operations: OperationContainer) -> Result<(), TransportError>;
}
