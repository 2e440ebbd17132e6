/// Rate limiting for mutating endpoints
///
/// Token bucket limiter shared by every request that changes the directory
/// (likes, new categories, new pages).

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::metrics::RATE_LIMITED_REQUESTS;

#[derive(Clone)]
pub struct RateLimiter {
    /// Global limiter (total mutating requests per second)
    global: Option<Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `global_rps` - Max mutating requests per second (0 = unlimited)
    pub fn new(global_rps: u32) -> Self {
        let global = NonZeroU32::new(global_rps).map(|rps| {
            let quota = Quota::per_second(rps);
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        Self { global }
    }

    /// Check if a request to `route` should be allowed
    pub fn check(&self, route: &str) -> Result<(), AppError> {
        if let Some(limiter) = &self.global {
            match limiter.check() {
                Ok(_) => debug!("Rate limit check passed for {}", route),
                Err(_) => {
                    warn!("Rate limit exceeded for {}", route);
                    RATE_LIMITED_REQUESTS.with_label_values(&[route]).inc();
                    return Err(AppError::RateLimited);
                }
            }
        }

        Ok(())
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.global.is_some()
    }
}
