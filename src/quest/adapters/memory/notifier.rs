//! Recording notification gateway.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::config::NotificationConfig;
use crate::quest::{
    domain::{NotificationTarget, Recipient},
    ports::{Notifier, NotifierError, NotifierResult},
};

/// One message accepted for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Platform address built from the configured account.
    pub address: String,
    /// Recipient display name.
    pub display_name: String,
    /// Message body.
    pub message: String,
}

/// Notifier that records deliveries instead of sending them.
///
/// Recipients on platforms without a configured account are skipped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    routes: NotificationConfig,
    state: Arc<RwLock<NotifierState>>,
}

#[derive(Debug, Default)]
struct NotifierState {
    deliveries: Vec<Delivery>,
    unavailable: bool,
}

impl InMemoryNotifier {
    /// Creates a notifier using the given platform routes.
    #[must_use]
    pub fn new(routes: NotificationConfig) -> Self {
        Self {
            routes,
            state: Arc::default(),
        }
    }

    /// Returns every recorded delivery in send order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.state
            .read()
            .map(|state| state.deliveries.clone())
            .unwrap_or_default()
    }

    /// Makes subsequent deliveries fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.write() {
            state.unavailable = unavailable;
        }
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(
        &self,
        recipients: &[NotificationTarget],
        message: &str,
    ) -> NotifierResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| NotifierError::unavailable(std::io::Error::other(err.to_string())))?;
        if state.unavailable {
            return Err(NotifierError::unavailable(std::io::Error::other(
                "gateway marked unavailable",
            )));
        }

        for recipient in recipients {
            let Some(address) = self.routes.address_for(recipient) else {
                tracing::debug!(
                    contact = %recipient.contact(),
                    "no account configured for platform, skipping"
                );
                continue;
            };
            state.deliveries.push(Delivery {
                address,
                display_name: recipient.display_name().to_string(),
                message: message.to_owned(),
            });
        }
        Ok(())
    }
}
