use std::env;

pub const DEFAULT_EMAILJS_API_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_passphrase: String,
    pub emailjs_api_url: String,
    pub emailjs_service_id: String,
    pub emailjs_template_id: String,
    pub emailjs_public_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "repairdesk.db".to_string()),
            admin_passphrase: env::var("ADMIN_PASSPHRASE")
                .unwrap_or_else(|_| "ecareadmin123".to_string()),
            emailjs_api_url: env::var("EMAILJS_API_URL")
                .unwrap_or_else(|_| DEFAULT_EMAILJS_API_URL.to_string()),
            emailjs_service_id: env::var("EMAILJS_SERVICE_ID").unwrap_or_default(),
            emailjs_template_id: env::var("EMAILJS_TEMPLATE_ID").unwrap_or_default(),
            emailjs_public_key: env::var("EMAILJS_PUBLIC_KEY").unwrap_or_default(),
        }
    }
}
