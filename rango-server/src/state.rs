use rango_core::{Directory, SessionStore};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Directory,
    pub sessions: SessionStore,
    pub rate_limiter: RateLimiter,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(directory: Directory, config: ServerConfig) -> Self {
        Self {
            directory,
            sessions: SessionStore::new(config.max_sessions),
            rate_limiter: RateLimiter::new(config.mutation_rps),
            config: Arc::new(config),
        }
    }
}
