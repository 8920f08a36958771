//! Application and signup session context
//!
//! `AppContext` is the shared state handed to every request handler.
//! `SignupSession` carries a guest through login, profile entry and payment
//! until a user record exists.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::models::UserDraft;
use crate::services::ServiceFactory;
use crate::state::storage::SessionStorage;
use crate::utils::helpers::generate_order_id;

/// Application-wide context containing services and settings
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub database: Arc<DatabaseService>,
    pub sessions: Arc<SessionStorage>,
    pub services: Arc<ServiceFactory>,
}

impl AppContext {
    pub fn new(
        settings: Settings,
        database: Arc<DatabaseService>,
        sessions: Arc<SessionStorage>,
        services: Arc<ServiceFactory>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            database,
            sessions,
            services,
        }
    }
}

/// A card payment about to be handed to the payment widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: i64,
    pub order_name: String,
}

impl PaymentOrder {
    pub fn new(amount: i64, order_name: impl Into<String>) -> Self {
        Self {
            order_id: generate_order_id(),
            amount,
            order_name: order_name.into(),
        }
    }
}

/// Gateway confirmation kept on the session after a successful payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub payment_key: String,
    pub order_id: String,
    pub amount: i64,
    pub method: Option<String>,
    pub approved_at: Option<String>,
}

/// Signup state of one guest, stored in Redis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupSession {
    pub id: Uuid,
    pub kakao_id: String,
    /// Name reported by Kakao, used to prefill the profile form
    pub kakao_name: String,
    pub draft: Option<UserDraft>,
    pub payment_order: Option<PaymentOrder>,
    pub payment_result: Option<PaymentResult>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SignupSession {
    pub fn new(kakao_id: impl Into<String>, kakao_name: impl Into<String>, ttl_seconds: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kakao_id: kakao_id.into(),
            kakao_name: kakao_name.into(),
            draft: None,
            payment_order: None,
            payment_result: None,
            expires_at: now + Duration::seconds(ttl_seconds as i64),
            updated_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Seconds until expiry, never below 60
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = (self.expires_at - Utc::now()).num_seconds();
        std::cmp::max(remaining, 60) as u64
    }

    pub fn set_draft(&mut self, draft: UserDraft) {
        self.draft = Some(draft);
        self.touch();
    }

    /// Start a new card payment; any earlier order or result is discarded
    pub fn start_payment(&mut self, order: PaymentOrder) {
        self.payment_order = Some(order);
        self.payment_result = None;
        self.touch();
    }

    pub fn record_payment(&mut self, result: PaymentResult) {
        self.payment_result = Some(result);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_expiry() {
        let session = SignupSession::new("k1", "민수", 3600);
        assert!(!session.is_expired());
        assert!(session.remaining_ttl_seconds() > 3500);
        assert!(session.draft.is_none());
    }

    #[test]
    fn test_expired_session_keeps_minimum_ttl() {
        let mut session = SignupSession::new("k1", "민수", 3600);
        session.expires_at = Utc::now() - Duration::seconds(5);
        assert!(session.is_expired());
        assert_eq!(session.remaining_ttl_seconds(), 60);
    }

    #[test]
    fn test_start_payment_clears_previous_result() {
        let mut session = SignupSession::new("k1", "민수", 3600);
        session.record_payment(PaymentResult {
            payment_key: "pk".to_string(),
            order_id: "order_1_abc".to_string(),
            amount: 30000,
            method: None,
            approved_at: None,
        });
        session.start_payment(PaymentOrder::new(30000, "꺄르륵 파티"));

        assert!(session.payment_result.is_none());
        let order = session.payment_order.as_ref().unwrap();
        assert!(order.order_id.starts_with("order_"));
        assert_eq!(order.amount, 30000);
    }
}
