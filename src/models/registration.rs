//! Registration model
//!
//! A registration links one user to one event. Stored rows carry two status
//! columns; in code a registration is either [`PendingRegistration`] or
//! [`ApprovedRegistration`]. Rejected and cancelled registrations are deleted,
//! so they have no in-memory form.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::PartyGateError;
use super::user::User;

text_enum! {
    /// Whether the registration fee has been confirmed
    pub enum PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

text_enum! {
    /// Admin disposition of a registration
    pub enum ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// Row as stored in the `registrations` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub payment_status: PaymentStatus,
    pub approval_status: ApprovalStatus,
    pub payment_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment state of a registration still waiting for approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PendingPayment {
    /// Bank transfer not yet confirmed
    AwaitingTransfer,
    /// Paid by card before the registration was created
    Paid { payment_id: Option<String> },
    Failed,
}

impl PendingPayment {
    pub fn status(&self) -> PaymentStatus {
        match self {
            PendingPayment::AwaitingTransfer => PaymentStatus::Pending,
            PendingPayment::Paid { .. } => PaymentStatus::Completed,
            PendingPayment::Failed => PaymentStatus::Failed,
        }
    }

    pub fn payment_id(&self) -> Option<&str> {
        match self {
            PendingPayment::Paid { payment_id } => payment_id.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub payment: PendingPayment,
    pub submitted_at: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedRegistration {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub payment_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub registered_at: DateTime<Utc>,
    pub approved_at: DateTime<Utc>,
}

impl PendingRegistration {
    /// Admin approval: approval becomes `approved`, payment `completed`
    pub fn approve(self, approved_at: DateTime<Utc>) -> ApprovedRegistration {
        ApprovedRegistration {
            id: self.id,
            user_id: self.user_id,
            event_id: self.event_id,
            payment_id: self.payment.payment_id().map(str::to_string),
            submitted_at: self.submitted_at,
            registered_at: self.registered_at,
            approved_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "approvalStatus", rename_all = "lowercase")]
pub enum Registration {
    Pending(PendingRegistration),
    Approved(ApprovedRegistration),
}

impl Registration {
    pub fn id(&self) -> i64 {
        match self {
            Registration::Pending(r) => r.id,
            Registration::Approved(r) => r.id,
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            Registration::Pending(r) => r.user_id,
            Registration::Approved(r) => r.user_id,
        }
    }

    pub fn event_id(&self) -> i64 {
        match self {
            Registration::Pending(r) => r.event_id,
            Registration::Approved(r) => r.event_id,
        }
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        match self {
            Registration::Pending(r) => r.submitted_at,
            Registration::Approved(r) => r.submitted_at,
        }
    }

    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            Registration::Pending(_) => ApprovalStatus::Pending,
            Registration::Approved(_) => ApprovalStatus::Approved,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            Registration::Pending(r) => r.payment.status(),
            Registration::Approved(_) => PaymentStatus::Completed,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Registration::Approved(_))
    }
}

impl TryFrom<RegistrationRecord> for Registration {
    type Error = PartyGateError;

    fn try_from(record: RegistrationRecord) -> Result<Self, Self::Error> {
        match (record.approval_status, record.payment_status) {
            (ApprovalStatus::Pending, payment_status) => {
                let payment = match payment_status {
                    PaymentStatus::Pending => PendingPayment::AwaitingTransfer,
                    PaymentStatus::Completed => PendingPayment::Paid { payment_id: record.payment_id },
                    PaymentStatus::Failed => PendingPayment::Failed,
                };
                Ok(Registration::Pending(PendingRegistration {
                    id: record.id,
                    user_id: record.user_id,
                    event_id: record.event_id,
                    payment,
                    submitted_at: record.submitted_at,
                    registered_at: record.registered_at,
                }))
            }
            (ApprovalStatus::Approved, PaymentStatus::Completed) => {
                Ok(Registration::Approved(ApprovedRegistration {
                    id: record.id,
                    user_id: record.user_id,
                    event_id: record.event_id,
                    payment_id: record.payment_id,
                    submitted_at: record.submitted_at,
                    registered_at: record.registered_at,
                    approved_at: record.updated_at,
                }))
            }
            (approval, payment) => Err(PartyGateError::InvalidStateTransition {
                from: format!("registration {}", record.id),
                to: format!("{}/{}", approval, payment),
            }),
        }
    }
}

/// Payment path a registration is created from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistration {
    pub user_id: i64,
    pub event_id: i64,
    pub payment: PendingPayment,
}

impl NewRegistration {
    /// Bank transfer signup: payment confirmed later by the admin
    pub fn bank_transfer(user_id: i64, event_id: i64) -> Self {
        Self { user_id, event_id, payment: PendingPayment::AwaitingTransfer }
    }

    /// Card signup after the gateway confirmed the payment
    pub fn paid(user_id: i64, event_id: i64, payment_key: impl Into<String>) -> Self {
        Self {
            user_id,
            event_id,
            payment: PendingPayment::Paid { payment_id: Some(payment_key.into()) },
        }
    }
}

/// Admin listing row: a registration joined with its user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationWithUser {
    pub registration_id: i64,
    pub user: User,
    pub submitted_at: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(approval: ApprovalStatus, payment: PaymentStatus) -> RegistrationRecord {
        let now = Utc::now();
        RegistrationRecord {
            id: 10,
            user_id: 2,
            event_id: 3,
            payment_status: payment,
            approval_status: approval,
            payment_id: Some("pay_1".to_string()),
            submitted_at: now,
            registered_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_records_map_to_pending_variants() {
        let bank = Registration::try_from(record(ApprovalStatus::Pending, PaymentStatus::Pending)).unwrap();
        assert_eq!(bank.payment_status(), PaymentStatus::Pending);
        assert_eq!(bank.approval_status(), ApprovalStatus::Pending);

        let card = Registration::try_from(record(ApprovalStatus::Pending, PaymentStatus::Completed)).unwrap();
        match card {
            Registration::Pending(p) => assert_eq!(p.payment.payment_id(), Some("pay_1")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_approved_requires_completed_payment() {
        let ok = Registration::try_from(record(ApprovalStatus::Approved, PaymentStatus::Completed)).unwrap();
        assert!(ok.is_approved());

        let err = Registration::try_from(record(ApprovalStatus::Approved, PaymentStatus::Pending)).unwrap_err();
        assert!(matches!(err, PartyGateError::InvalidStateTransition { .. }));

        let rejected = Registration::try_from(record(ApprovalStatus::Rejected, PaymentStatus::Pending));
        assert!(rejected.is_err());
    }

    #[test]
    fn test_approve_transition_completes_payment() {
        let pending = PendingRegistration {
            id: 1,
            user_id: 2,
            event_id: 3,
            payment: PendingPayment::AwaitingTransfer,
            submitted_at: Utc::now(),
            registered_at: Utc::now(),
        };
        let approved = Registration::Approved(pending.approve(Utc::now()));
        assert_eq!(approved.payment_status(), PaymentStatus::Completed);
        assert_eq!(approved.approval_status(), ApprovalStatus::Approved);
        assert_eq!(approved.id(), 1);
    }

    #[test]
    fn test_new_registration_paths() {
        assert_eq!(NewRegistration::bank_transfer(1, 2).payment.status(), PaymentStatus::Pending);
        let paid = NewRegistration::paid(1, 2, "pk_123");
        assert_eq!(paid.payment.status(), PaymentStatus::Completed);
        assert_eq!(paid.payment.payment_id(), Some("pk_123"));
    }
}
