use std::sync::Arc;

use crate::config::PaginationConfig;
use crate::notify::MailService;
use crate::store::traits::Store;
use crate::store::CityInfoRepository;

/// Shared state handed to every handler
pub struct AppState<S> {
    pub store: Arc<S>,
    pub mailer: Arc<dyn MailService>,
    pub pagination: PaginationConfig,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            mailer: self.mailer.clone(),
            pagination: self.pagination,
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(store: Arc<S>, mailer: Arc<dyn MailService>, pagination: PaginationConfig) -> Self {
        Self {
            store,
            mailer,
            pagination,
        }
    }

    /// Fresh repository scoped to one request
    pub fn repository(&self) -> CityInfoRepository<S> {
        CityInfoRepository::new(self.store.clone())
    }
}
