//! Notification gateway port.

use crate::quest::domain::{ContactHandle, NotificationTarget};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Out-of-band delivery of short messages to guild members.
///
/// Callers treat delivery as fire-and-forget: errors are logged and never
/// change the outcome of the operation that triggered them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `message` to every recipient.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when delivery to any recipient fails.
    async fn notify(&self, recipients: &[NotificationTarget], message: &str)
    -> NotifierResult<()>;
}

/// Errors returned by notification gateways.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The gateway rejected delivery to one recipient.
    #[error("delivery to {contact} failed: {reason}")]
    Delivery {
        /// Recipient contact handle.
        contact: ContactHandle,
        /// Gateway-supplied reason.
        reason: String,
    },

    /// The gateway could not be reached.
    #[error("notification gateway unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Wraps a transport failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
