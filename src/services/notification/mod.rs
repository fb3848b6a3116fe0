pub mod emailjs;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::models::Booking;

/// Template parameters for the booking confirmation email.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingEmail {
    pub order_id: String,
    pub customer_name: String,
    pub service_type: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub phone_number: String,
    pub address: String,
    pub email: String,
    pub reply_to: String,
}

impl From<&Booking> for BookingEmail {
    fn from(b: &Booking) -> Self {
        Self {
            order_id: b.order_id.clone(),
            customer_name: b.customer_name.clone(),
            service_type: b.service_type.as_str().to_string(),
            preferred_date: b.preferred_date.clone(),
            preferred_time: b.preferred_time.clone(),
            phone_number: b.phone_number.clone(),
            address: b.address.clone(),
            email: b.email.clone(),
            reply_to: b.email.clone(),
        }
    }
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, params: &BookingEmail) -> anyhow::Result<()>;
}

/// Best-effort booking confirmation. Sends run as detached tasks and their
/// outcome only ever reaches the log.
#[derive(Clone)]
pub struct Notifier {
    provider: Option<Arc<dyn EmailProvider>>,
}

impl Notifier {
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn disabled() -> Self {
        Self { provider: None }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match emailjs::EmailJsProvider::from_config(config) {
            Some(provider) => {
                tracing::info!("booking confirmation emails enabled");
                Self::new(Arc::new(provider))
            }
            None => {
                tracing::warn!("EmailJS credentials missing, booking confirmation emails disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Spawn the confirmation send. Returns `None` when no provider is configured.
    pub fn booking_created(&self, booking: &Booking) -> Option<JoinHandle<()>> {
        let Some(provider) = self.provider.clone() else {
            tracing::debug!(order_id = %booking.order_id, "email notification skipped, not configured");
            return None;
        };

        let params = BookingEmail::from(booking);
        Some(tokio::spawn(async move {
            match provider.send(&params).await {
                Ok(()) => tracing::info!(order_id = %params.order_id, "confirmation email sent"),
                Err(e) => tracing::warn!(
                    order_id = %params.order_id,
                    error = %e,
                    "confirmation email failed, booking still saved"
                ),
            }
        }))
    }
}
