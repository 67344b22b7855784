use std::sync::Arc;

use api::{MailRelay, ProjectCatalog};

use crate::rate_limit::RateLimiter;

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ProjectCatalog>,
    pub mailer: Arc<dyn MailRelay>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(projects: Arc<dyn ProjectCatalog>, mailer: Arc<dyn MailRelay>) -> Self {
        Self {
            projects,
            mailer,
            limiter: Arc::new(RateLimiter::default()),
        }
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Arc::new(limiter);
        self
    }
}
