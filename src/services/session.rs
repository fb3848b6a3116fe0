use std::collections::HashSet;
use std::sync::Mutex;

/// Admin sessions unlocked by the shared passphrase. Tokens live in memory
/// only and vanish on restart.
#[derive(Default)]
pub struct SessionStore {
    tokens: Mutex<HashSet<String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token when `passphrase` matches the configured one.
    pub fn login(&self, passphrase: &str, expected: &str) -> Option<String> {
        if expected.is_empty() || passphrase != expected {
            tracing::warn!("admin login rejected");
            return None;
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.clone());
        tracing::info!("admin session opened");
        Some(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        !token.is_empty()
            && self
                .tokens
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .contains(token)
    }

    pub fn logout(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
    }
}
