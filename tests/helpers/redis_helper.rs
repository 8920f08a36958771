//! Test Redis helper utilities

use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::{Redis, REDIS_PORT};
use uuid::Uuid;
use PartyGate::config::RedisConfig;
use PartyGate::state::SessionStorage;
use super::init_tracing;

pub struct TestRedis {
    pub config: RedisConfig,
    _container: Option<ContainerAsync<Redis>>,
}

impl TestRedis {
    /// `TEST_REDIS_URL` if set, else a throwaway container
    pub async fn try_new() -> Option<Self> {
        init_tracing();

        let (url, container) = match std::env::var("TEST_REDIS_URL") {
            Ok(url) => (url, None),
            Err(_) => {
                let container = match Redis::default().start().await {
                    Ok(container) => container,
                    Err(e) => {
                        eprintln!("skipping: cannot start redis container: {}", e);
                        return None;
                    }
                };
                let port = container.get_host_port_ipv4(REDIS_PORT).await.ok()?;
                (format!("redis://127.0.0.1:{}", port), Some(container))
            }
        };

        // A unique prefix keeps runs against a shared server apart
        let config = RedisConfig {
            url,
            prefix: format!("partygate-test-{}:", Uuid::new_v4().simple()),
            ttl_seconds: 600,
        };
        Some(Self { config, _container: container })
    }

    pub async fn storage(&self) -> SessionStorage {
        SessionStorage::new(self.config.clone()).await.expect("Failed to connect to redis")
    }
}
