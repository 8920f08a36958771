//! Rate limiting middleware
//!
//! Limits password attempts per client key. Each key may spend
//! `max_requests + burst_allowance` attempts at once; afterwards attempts
//! replenish at `max_requests` per window.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::config::AccessConfig;
use crate::utils::errors::{PartyGateError, Result};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
    /// Burst allowance (extra requests allowed in short bursts)
    pub burst_allowance: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window_duration: Duration::from_secs(60),
            burst_allowance: 5,
        }
    }
}

impl From<&AccessConfig> for RateLimitConfig {
    fn from(access: &AccessConfig) -> Self {
        Self {
            max_requests: access.max_attempts,
            window_duration: Duration::from_secs(access.window_seconds),
            burst_allowance: access.burst_allowance,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Result<Quota> {
        let max_requests = NonZeroU32::new(self.max_requests).ok_or_else(|| {
            PartyGateError::Config("rate limit max_requests must be greater than 0".to_string())
        })?;
        let period = self.window_duration / max_requests.get();
        let burst = NonZeroU32::new(self.max_requests.saturating_add(self.burst_allowance))
            .unwrap_or(max_requests);

        let quota = Quota::with_period(period).ok_or_else(|| {
            PartyGateError::Config("rate limit window must be longer than zero".to_string())
        })?;
        Ok(quota.allow_burst(burst))
    }
}

/// Keyed rate limiter for gate password attempts
#[derive(Clone)]
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl RateLimitMiddleware {
    /// Create a new RateLimitMiddleware instance
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        let limiter = RateLimiter::keyed(config.quota()?);

        Ok(Self {
            config,
            limiter: Arc::new(limiter),
        })
    }

    /// Consume one attempt for the client, failing once its quota is spent
    pub fn check_rate_limit(&self, client_key: &str) -> Result<()> {
        match self.limiter.check_key(&client_key.to_string()) {
            Ok(()) => {
                debug!(client = client_key, "Rate limit check passed");
                Ok(())
            }
            Err(_) => {
                warn!(client = client_key, "Rate limit exceeded");
                Err(PartyGateError::RateLimitExceeded)
            }
        }
    }

    /// Drop state for keys that have fully replenished
    pub fn cleanup_old_entries(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(remaining_entries = self.tracked_clients(), "Cleaned up old rate limit entries");
    }

    /// Number of client keys currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

impl std::fmt::Debug for RateLimitMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitMiddleware")
            .field("config", &self.config)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Spawn a task that periodically prunes idle rate limit entries
pub fn spawn_cleanup(limiter: RateLimitMiddleware) -> tokio::task::JoinHandle<()> {
    let every = limiter.config.window_duration.max(Duration::from_secs(1)) * 2;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            limiter.cleanup_old_entries();
        }
    })
}
