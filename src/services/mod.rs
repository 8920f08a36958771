//! Services module
//!
//! This module contains business logic services

pub mod access;
pub mod kakao;
pub mod payment;
pub mod questionnaire;
pub mod registration;
pub mod report;
pub mod signup;

// Re-export commonly used services
pub use access::{AccessService, GateClaims, GatePass, MemberClaims};
pub use kakao::{KakaoIdentity, KakaoService};
pub use payment::{ConfirmRequest, ConfirmedPayment, PaymentService};
pub use questionnaire::QuestionnaireService;
pub use registration::{CurrentEvent, RegistrationService};
pub use report::{EventStats, GenderStats, ParticipantReport, ReportService};
pub use signup::{LoginResolution, PaidRegistration, PaymentReceipt, ProfileInput, SignupService};

use std::sync::Arc;
use serde::Serialize;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::RemovalPolicy;
use crate::state::SessionStorage;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
#[derive(Debug)]
pub struct ServiceFactory {
    pub registration: RegistrationService,
    pub access: AccessService,
    pub kakao: KakaoService,
    pub payment: PaymentService,
    pub signup: SignupService,
    pub questionnaire: QuestionnaireService,
    pub report: ReportService,
    database: Arc<DatabaseService>,
    sessions: Arc<SessionStorage>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: Arc<DatabaseService>, sessions: Arc<SessionStorage>) -> Result<Self> {
        let removal_policy = RemovalPolicy::from_legacy_flag(settings.registration.legacy_cancel_accounting);
        let registration = RegistrationService::new(database.clone(), removal_policy);
        let access = AccessService::new(settings.access.clone())?;
        let kakao = KakaoService::new(settings.kakao.clone(), settings.kakao_redirect_uri())?;
        let payment = PaymentService::new(settings.toss.clone())?;
        let signup = SignupService::new(database.clone(), sessions.clone(), registration.clone(), payment.clone());
        let questionnaire = QuestionnaireService::new(database.clone());
        let report = ReportService::new(database.clone());

        Ok(Self {
            registration,
            access,
            kakao,
            payment,
            signup,
            questionnaire,
            report,
            database,
            sessions,
        })
    }

    /// Health check for the backing stores
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = crate::database::connection::health_check(self.database.pool()).await.is_ok();
        let redis_healthy = self.sessions.health_check().await.is_ok();

        ServiceHealthStatus {
            database_healthy,
            redis_healthy,
            payment_test_mode: self.payment.is_test_mode(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
    pub redis_healthy: bool,
    pub payment_test_mode: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy && self.redis_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }
        if !self.redis_healthy {
            issues.push("Redis connection failed".to_string());
        }

        issues
    }
}
