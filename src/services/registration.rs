//! Registration lifecycle service
//!
//! Wraps the transactional database operations with logging and the
//! configured ledger removal policy.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::database::service::{ApprovalOutcome, CancellationOutcome};
use crate::database::DatabaseService;
use crate::models::{
    ApprovalStatus, CreateEventRequest, Event, NewRegistration, Registration, RegistrationWithUser, RejectionCheck, RejectionRecord,
    RemovalPolicy, SlotStatus, UpdateEventRequest,
};
use crate::utils::errors::{PartyGateError, Result};
use crate::utils::logging::{log_admin_action, log_ledger_change, log_registration_action};

/// The event guests currently sign up for, with its slot summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEvent {
    pub event: Event,
    pub slots: SlotStatus,
}

impl From<Event> for CurrentEvent {
    fn from(event: Event) -> Self {
        let slots = event.slot_status();
        Self { event, slots }
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct RegistrationService {
    database: Arc<DatabaseService>,
    removal_policy: RemovalPolicy,
}

impl RegistrationService {
    pub fn new(database: Arc<DatabaseService>, removal_policy: RemovalPolicy) -> Self {
        Self { database, removal_policy }
    }

    /// First open event, else first full event
    pub async fn current_event(&self) -> Result<Option<CurrentEvent>> {
        Ok(self.database.events.find_current().await?.map(CurrentEvent::from))
    }

    /// Current event or `EventNotFound`
    pub async fn require_current_event(&self) -> Result<Event> {
        self.database
            .events
            .find_current()
            .await?
            .ok_or(PartyGateError::EventNotFound { event_id: 0 })
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.database
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(PartyGateError::EventNotFound { event_id })
    }

    pub async fn list_events(&self, limit: i64, offset: i64) -> Result<Vec<Event>> {
        self.database.events.list(limit, offset).await
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        if request.title.trim().is_empty() {
            return Err(PartyGateError::InvalidInput("Event title is required".to_string()));
        }
        if request.price < 0 || request.max_male_slots < 0 || request.max_female_slots < 0 {
            return Err(PartyGateError::InvalidInput("Price and slots must not be negative".to_string()));
        }

        let event = self.database.events.create(request).await?;
        log_admin_action("create_event", Some(&event.id.to_string()), Some(&event.title));
        Ok(event)
    }

    pub async fn update_event(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = self.database.events.update(event_id, request).await?;
        log_admin_action("update_event", Some(&event_id.to_string()), Some(event.status.as_str()));
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: i64) -> Result<()> {
        self.get_event(event_id).await?;
        self.database.events.delete(event_id).await?;
        log_admin_action("delete_event", Some(&event_id.to_string()), None);
        Ok(())
    }

    /// Create a pending registration; capacity is not checked
    pub async fn create(&self, request: NewRegistration) -> Result<Registration> {
        let registration = self.database.create_registration(request).await?;
        log_registration_action(
            registration.id(),
            "created",
            registration.user_id(),
            registration.event_id(),
        );
        Ok(registration)
    }

    pub async fn find_for(&self, user_id: i64, event_id: i64) -> Result<Option<Registration>> {
        self.database.registrations.find_by_user_event(user_id, event_id).await
    }

    /// Admin approval
    pub async fn approve(&self, registration_id: i64) -> Result<ApprovalOutcome> {
        let outcome = self.database.approve_registration(registration_id).await?;
        let registration = &outcome.registration;

        log_registration_action(registration.id, "approved", registration.user_id, registration.event_id);
        log_ledger_change(registration.event_id, "add", registration.user_id, outcome.ledger.membership_changed);
        log_admin_action("approve_registration", Some(&registration_id.to_string()), None);
        Ok(outcome)
    }

    /// Admin rejection; leaves the ledger untouched
    pub async fn reject(&self, registration_id: i64) -> Result<RejectionRecord> {
        let rejection = self.database.reject_registration(registration_id).await?;

        info!(
            registration_id = registration_id,
            event_id = rejection.event_id,
            user_name = %rejection.user_name,
            "Registration rejected"
        );
        log_admin_action("reject_registration", Some(&registration_id.to_string()), Some(&rejection.reason));
        Ok(rejection)
    }

    /// User cancellation
    pub async fn cancel(&self, user_id: i64, event_id: i64) -> Result<CancellationOutcome> {
        let outcome = self.database.cancel_registration(user_id, event_id, self.removal_policy).await?;

        log_registration_action(outcome.registration_id, "cancelled", user_id, event_id);
        log_ledger_change(event_id, "remove", user_id, outcome.ledger.count_delta != 0);
        Ok(outcome)
    }

    /// Pending registrations of an event, oldest submission first
    pub async fn pending(&self, event_id: i64) -> Result<Vec<RegistrationWithUser>> {
        self.by_status(event_id, ApprovalStatus::Pending).await
    }

    pub async fn by_status(&self, event_id: i64, status: ApprovalStatus) -> Result<Vec<RegistrationWithUser>> {
        debug!(event_id = event_id, status = %status, "Listing registrations");
        self.database.registrations.list_by_event_status(event_id, status).await
    }

    /// Rejection and cancellation history of an event, newest first
    pub async fn rejections(&self, event_id: i64) -> Result<Vec<RejectionRecord>> {
        self.database.rejections.list_for_event(event_id).await
    }

    /// Whether this Kakao identity was rejected for the event before
    pub async fn check_prior_rejection(&self, kakao_id: &str, event_id: i64) -> Result<RejectionCheck> {
        let record = self.database.rejections.find_latest(kakao_id, event_id).await?;
        Ok(RejectionCheck::from(record))
    }
}
