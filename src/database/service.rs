//! Database service layer
//!
//! This module provides a high-level interface to database operations.
//! Approve, reject and cancel each run in a single transaction.

use chrono::Utc;
use serde::Serialize;
use crate::database::{
    DatabasePool, UserRepository, EventRepository, RegistrationRepository, RejectionRepository,
    QuestionRepository, AnswerRepository, MenuRepository,
};
use crate::models::*;
use crate::utils::errors::PartyGateError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pub rejections: RejectionRepository,
    pub questions: QuestionRepository,
    pub answers: AnswerRepository,
    pub menu: MenuRepository,
}

/// Result of approving a registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub registration: ApprovedRegistration,
    pub ledger: LedgerChange,
}

/// Result of a user cancelling their registration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationOutcome {
    pub registration_id: i64,
    pub ledger: LedgerChange,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            rejections: RejectionRepository::new(pool.clone()),
            questions: QuestionRepository::new(pool.clone()),
            answers: AnswerRepository::new(pool.clone()),
            menu: MenuRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Create a user, or return the existing one with the same Kakao id
    pub async fn initialize_user(&self, request: CreateUserRequest) -> Result<User, PartyGateError> {
        if let Some(kakao_id) = request.kakao_id.as_deref() {
            if let Some(existing_user) = self.users.find_by_kakao_id(kakao_id).await? {
                return Ok(existing_user);
            }
        }

        self.users.create(request).await
    }

    /// Create a pending registration for a (user, event) pair
    pub async fn create_registration(&self, request: NewRegistration) -> Result<Registration, PartyGateError> {
        if self.registrations.find_by_user_event(request.user_id, request.event_id).await?.is_some() {
            return Err(PartyGateError::DuplicateRegistration {
                user_id: request.user_id,
                event_id: request.event_id,
            });
        }

        self.registrations.create(request).await
    }

    /// Approve a registration and add its user to the event ledger
    pub async fn approve_registration(&self, registration_id: i64) -> Result<ApprovalOutcome, PartyGateError> {
        let mut tx = self.pool.begin().await?;

        let record = RegistrationRepository::lock_by_id(&mut tx, registration_id)
            .await?
            .ok_or_else(|| PartyGateError::registration_not_found(registration_id))?;
        let user = UserRepository::find_by_id_in(&mut tx, record.user_id)
            .await?
            .ok_or(PartyGateError::UserNotFound { user_id: record.user_id })?;
        EventRepository::find_by_id_in(&mut tx, record.event_id)
            .await?
            .ok_or(PartyGateError::EventNotFound { event_id: record.event_id })?;

        let updated = RegistrationRepository::set_approved(&mut tx, registration_id).await?;
        let ledger = EventRepository::add_participant(&mut tx, record.event_id, user.id, user.gender).await?;

        tx.commit().await?;

        let registration = match Registration::try_from(updated)? {
            Registration::Approved(approved) => approved,
            Registration::Pending(pending) => pending.approve(Utc::now()),
        };
        Ok(ApprovalOutcome { registration, ledger })
    }

    /// Reject a registration: record the rejection, then delete the
    /// registration, its questionnaire answers and the user
    pub async fn reject_registration(&self, registration_id: i64) -> Result<RejectionRecord, PartyGateError> {
        let mut tx = self.pool.begin().await?;

        let record = RegistrationRepository::lock_by_id(&mut tx, registration_id)
            .await?
            .ok_or_else(|| PartyGateError::registration_not_found(registration_id))?;
        let user = UserRepository::find_by_id_in(&mut tx, record.user_id)
            .await?
            .ok_or(PartyGateError::UserNotFound { user_id: record.user_id })?;

        let rejection = RejectionRepository::create_in(
            &mut tx,
            CreateRejectionRequest {
                kakao_id: user.kakao_id.clone(),
                event_id: record.event_id,
                user_name: user.name.clone(),
                reason: REASON_ADMIN_REJECTED.to_string(),
            },
        )
        .await?;

        RegistrationRepository::delete_in(&mut tx, record.id).await?;
        AnswerRepository::delete_in(&mut tx, record.user_id, record.event_id).await?;
        UserRepository::delete_in(&mut tx, record.user_id).await?;

        tx.commit().await?;
        Ok(rejection)
    }

    /// Cancel the registration of a user: delete it, remove the user from the
    /// event ledger, then delete questionnaire answers and the user
    pub async fn cancel_registration(
        &self,
        user_id: i64,
        event_id: i64,
        policy: RemovalPolicy,
    ) -> Result<CancellationOutcome, PartyGateError> {
        let mut tx = self.pool.begin().await?;

        let user = UserRepository::find_by_id_in(&mut tx, user_id)
            .await?
            .ok_or(PartyGateError::UserNotFound { user_id })?;
        let record = RegistrationRepository::find_by_user_event_in(&mut tx, user_id, event_id)
            .await?
            .ok_or_else(|| PartyGateError::registration_not_found_for(user_id, event_id))?;
        EventRepository::find_by_id_in(&mut tx, event_id)
            .await?
            .ok_or(PartyGateError::EventNotFound { event_id })?;

        RegistrationRepository::delete_in(&mut tx, record.id).await?;
        let ledger = EventRepository::remove_participant(&mut tx, event_id, user_id, user.gender, policy).await?;
        AnswerRepository::delete_in(&mut tx, user_id, event_id).await?;
        UserRepository::delete_in(&mut tx, user_id).await?;

        tx.commit().await?;
        Ok(CancellationOutcome { registration_id: record.id, ledger })
    }
}
