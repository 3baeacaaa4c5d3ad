use crate::config::Settings;
use crate::storage::RecordStore;
use std::sync::Arc;

pub struct AppState<S> {
    pub store: Arc<S>,
    pub settings: Arc<Settings>,
}

impl<S: RecordStore> AppState<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: Arc::clone(&self.settings),
        }
    }
}
