//! Signup session storage
//!
//! Sessions are stored as JSON under `{prefix}signup:{id}` with a TTL
//! matching the session expiry.

use redis::AsyncCommands;
use tracing::{debug, error, warn};
use uuid::Uuid;
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::context::SignupSession;

/// Redis-based signup session storage
#[derive(Clone)]
pub struct SessionStorage {
    /// Redis connection manager
    connection_manager: redis::aio::ConnectionManager,
    /// Redis configuration
    config: RedisConfig,
}

impl SessionStorage {
    /// Create a new session storage instance
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// Lifetime given to newly created sessions
    pub fn session_ttl_seconds(&self) -> u64 {
        self.config.ttl_seconds
    }

    /// Create and persist a fresh session for a Kakao identity
    pub async fn create(&self, kakao_id: &str, kakao_name: &str) -> Result<SignupSession> {
        let session = SignupSession::new(kakao_id, kakao_name, self.config.ttl_seconds);
        self.save(&session).await?;
        Ok(session)
    }

    /// Save a session to Redis
    pub async fn save(&self, session: &SignupSession) -> Result<()> {
        let key = self.session_key(session.id);
        let serialized = serde_json::to_string(session)?;
        let ttl_seconds = session.remaining_ttl_seconds();

        let mut conn = self.connection_manager.clone();
        match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            Ok(_) => {
                debug!(session_id = %session.id, ttl_seconds = ttl_seconds, "Signup session saved");
                Ok(())
            }
            Err(e) => {
                error!(session_id = %session.id, error = %e, "Failed to save signup session");
                Err(e.into())
            }
        }
    }

    /// Load a session; expired sessions are removed and reported as absent
    pub async fn load(&self, id: Uuid) -> Result<Option<SignupSession>> {
        let key = self.session_key(id);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;
        let Some(data) = serialized else {
            debug!(session_id = %id, "No signup session found");
            return Ok(None);
        };

        let session: SignupSession = serde_json::from_str(&data)?;
        if session.is_expired() {
            warn!(session_id = %id, expires_at = %session.expires_at, "Signup session has expired, removing");
            self.delete(id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete a session
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let key = self.session_key(id);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(session_id = %id, deleted = deleted > 0, "Signup session delete");
        Ok(())
    }

    /// Check if a session exists
    pub async fn exists(&self, id: Uuid) -> Result<bool> {
        let key = self.session_key(id);
        let mut conn = self.connection_manager.clone();

        let exists: bool = conn.exists(&key).await?;
        Ok(exists)
    }

    /// Check Redis connectivity
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn session_key(&self, id: Uuid) -> String {
        session_key(&self.config.prefix, id)
    }
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage")
            .field("prefix", &self.config.prefix)
            .finish_non_exhaustive()
    }
}

/// Redis key of a signup session
pub fn session_key(prefix: &str, id: Uuid) -> String {
    format!("{}signup:{}", prefix, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            session_key("partygate:", id),
            "partygate:signup:00000000-0000-0000-0000-000000000000"
        );
    }
}
