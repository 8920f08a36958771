//! Event password gate
//!
//! A correct event password is exchanged for a signed gate pass (HS256 JWT)
//! that the signup endpoints require. Once a guest is registered they also
//! receive a member pass bound to their user id for the participant routes.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::config::AccessConfig;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimitMiddleware};
use crate::utils::errors::{PartyGateError, Result};

const GATE_SUBJECT: &str = "guest";
const MEMBER_SUBJECT_PREFIX: &str = "user:";

/// Claims carried by a gate pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity proven by a member pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberClaims {
    pub user_id: i64,
}

/// Issued gate or member pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatePass {
    pub pass: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct AccessService {
    config: AccessConfig,
    rate_limiter: RateLimitMiddleware,
}

impl AccessService {
    pub fn new(config: AccessConfig) -> Result<Self> {
        let rate_limiter = RateLimitMiddleware::new(RateLimitConfig::from(&config))?;
        Ok(Self { config, rate_limiter })
    }

    pub fn rate_limiter(&self) -> &RateLimitMiddleware {
        &self.rate_limiter
    }

    /// Check the event password for a client and issue a gate pass
    pub fn verify(&self, client_key: &str, password: &str) -> Result<GatePass> {
        self.rate_limiter.check_rate_limit(client_key)?;

        if self.config.event_password.is_empty() || password.trim() != self.config.event_password {
            warn!(client = client_key, "Invalid event password attempt");
            return Err(PartyGateError::InvalidPassword);
        }

        let pass = self.issue(Utc::now())?;
        info!(client = client_key, expires_at = %pass.expires_at, "Gate pass issued");
        Ok(pass)
    }

    /// Sign a gate pass valid from `now`
    pub fn issue(&self, now: DateTime<Utc>) -> Result<GatePass> {
        self.sign(GATE_SUBJECT.to_string(), now)
    }

    /// Sign a member pass for a registered user
    pub fn issue_member(&self, user_id: i64, now: DateTime<Utc>) -> Result<GatePass> {
        let pass = self.sign(format!("{}{}", MEMBER_SUBJECT_PREFIX, user_id), now)?;
        info!(user_id = user_id, expires_at = %pass.expires_at, "Member pass issued");
        Ok(pass)
    }

    fn sign(&self, sub: String, now: DateTime<Utc>) -> Result<GatePass> {
        let expires_at = now + Duration::seconds(self.config.pass_ttl_seconds as i64);
        let claims = GateClaims {
            sub,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let pass = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.token_secret.as_bytes()),
        )?;

        Ok(GatePass { pass, expires_at })
    }

    /// Verify signature and expiry of a gate pass
    pub fn validate(&self, pass: &str) -> Result<GateClaims> {
        self.decode_claims(pass, Some(GATE_SUBJECT))
            .map_err(|e| PartyGateError::Authentication(format!("invalid gate pass: {}", e)))
    }

    /// Verify a member pass and recover the user it was issued to
    pub fn validate_member(&self, pass: &str) -> Result<MemberClaims> {
        let claims = self
            .decode_claims(pass, None)
            .map_err(|e| PartyGateError::Authentication(format!("invalid member pass: {}", e)))?;

        claims
            .sub
            .strip_prefix(MEMBER_SUBJECT_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map(|user_id| MemberClaims { user_id })
            .ok_or_else(|| PartyGateError::Authentication("not a member pass".to_string()))
    }

    fn decode_claims(
        &self,
        pass: &str,
        subject: Option<&str>,
    ) -> std::result::Result<GateClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.sub = subject.map(str::to_string);

        decode::<GateClaims>(
            pass,
            &DecodingKey::from_secret(self.config.token_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }

    /// Expiry of a validated pass
    pub fn expires_at(claims: &GateClaims) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(claims.exp, 0).single()
    }
}
