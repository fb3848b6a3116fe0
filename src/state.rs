use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::SharedStore;
use crate::services::bookings::BookingRepository;
use crate::services::careers::CareersRepository;
use crate::services::notification::Notifier;
use crate::services::session::SessionStore;

pub struct AppState {
    pub config: AppConfig,
    pub bookings: BookingRepository,
    pub careers: CareersRepository,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore, notifier: Notifier) -> Arc<Self> {
        Arc::new(Self {
            config,
            bookings: BookingRepository::new(Arc::clone(&store), notifier),
            careers: CareersRepository::new(store),
            sessions: SessionStore::new(),
        })
    }
}
