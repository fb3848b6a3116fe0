use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{BookingEmail, EmailProvider};
use crate::config::AppConfig;

pub struct EmailJsProvider {
    api_url: String,
    service_id: String,
    template_id: String,
    public_key: String,
    client: reqwest::Client,
}

impl EmailJsProvider {
    pub fn new(api_url: String, service_id: String, template_id: String, public_key: String) -> Self {
        Self {
            api_url,
            service_id,
            template_id,
            public_key,
            client: reqwest::Client::new(),
        }
    }

    /// `None` unless all three credentials are present.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if config.emailjs_service_id.is_empty()
            || config.emailjs_template_id.is_empty()
            || config.emailjs_public_key.is_empty()
        {
            return None;
        }

        Some(Self::new(
            config.emailjs_api_url.clone(),
            config.emailjs_service_id.clone(),
            config.emailjs_template_id.clone(),
            config.emailjs_public_key.clone(),
        ))
    }
}

#[async_trait]
impl EmailProvider for EmailJsProvider {
    async fn send(&self, params: &BookingEmail) -> anyhow::Result<()> {
        let body = json!({
            "service_id": self.service_id,
            "template_id": self.template_id,
            "user_id": self.public_key,
            "template_params": params,
        });

        self.client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .context("failed to call EmailJS")?
            .error_for_status()
            .context("EmailJS API returned error")?;

        Ok(())
    }
}
