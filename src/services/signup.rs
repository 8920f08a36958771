//! Guest signup flow
//!
//! Kakao login → profile → bank transfer or card payment → pending
//! registration. Everything collected before the user record exists lives
//! in the guest's [`SignupSession`].

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::database::DatabaseService;
use crate::models::{CreateUserRequest, Event, Gender, NewRegistration, Registration, RejectionCheck, User, UserDraft};
use crate::services::kakao::KakaoIdentity;
use crate::services::payment::{payment_method_text, verify_payment_amount, ConfirmRequest, PaymentService};
use crate::services::registration::RegistrationService;
use crate::state::{PaymentOrder, PaymentResult, SessionStorage, SignupSession};
use crate::utils::errors::{PartyGateError, Result};
use crate::utils::helpers::{format_currency, is_valid_phone, normalize_phone_number, normalize_whitespace};

/// Profile form submitted by a guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: String,
    pub phone_number: String,
    pub gender: Gender,
    pub age: i32,
}

impl ProfileInput {
    /// Validate the form and turn it into a draft for the given identity
    pub fn into_draft(self, kakao_id: &str) -> Result<UserDraft> {
        let name = normalize_whitespace(&self.name);
        if name.is_empty() {
            return Err(PartyGateError::InvalidInput("이름을 입력해주세요.".to_string()));
        }
        if !is_valid_phone(&self.phone_number) {
            return Err(PartyGateError::InvalidInput("올바른 전화번호를 입력해주세요.".to_string()));
        }
        if !(1..=120).contains(&self.age) {
            return Err(PartyGateError::InvalidInput("올바른 나이를 입력해주세요.".to_string()));
        }

        Ok(UserDraft {
            kakao_id: kakao_id.to_string(),
            name,
            phone_number: normalize_phone_number(&self.phone_number),
            gender: self.gender,
            age: self.age,
        })
    }
}

/// Where a guest goes after logging in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "next", rename_all = "snake_case")]
pub enum LoginResolution {
    /// Approved for the current event, or no current event to check
    Dashboard { user: User, registration: Option<Registration> },
    /// Registered and waiting for approval
    Waiting { user: User, registration: Registration },
    /// Known user without a registration for the current event
    #[serde(rename_all = "camelCase")]
    Apply { user: User, session_id: Uuid },
    /// First visit; a prior rejection is reported but does not block
    #[serde(rename_all = "camelCase")]
    NewSignup { session_id: Uuid, kakao_name: String, prior_rejection: RejectionCheck },
}

impl LoginResolution {
    /// Id of the stored user; `None` for a first visit
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Dashboard { user, .. } | Self::Waiting { user, .. } | Self::Apply { user, .. } => Some(user.id),
            Self::NewSignup { .. } => None,
        }
    }
}

/// Receipt shown after a successful card payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub order_id: String,
    pub amount: i64,
    pub amount_text: String,
    pub method_text: Option<String>,
    pub approved_at: Option<String>,
}

impl From<&PaymentResult> for PaymentReceipt {
    fn from(result: &PaymentResult) -> Self {
        Self {
            order_id: result.order_id.clone(),
            amount: result.amount,
            amount_text: format_currency(result.amount),
            method_text: result.method.as_deref().map(|method| payment_method_text(method).to_string()),
            approved_at: result.approved_at.clone(),
        }
    }
}

/// Registration created by the card path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidRegistration {
    pub registration: Registration,
    pub receipt: PaymentReceipt,
}

/// Route a returning user who already registered for the current event
pub fn route_registered_user(user: User, registration: Registration) -> LoginResolution {
    if registration.is_approved() {
        LoginResolution::Dashboard { user, registration: Some(registration) }
    } else {
        LoginResolution::Waiting { user, registration }
    }
}

/// Check the order the gateway is confirming against the session's order
pub fn check_payment_order(order: &PaymentOrder, request: &ConfirmRequest, event_price: i64) -> Result<()> {
    if order.order_id != request.order_id {
        return Err(PartyGateError::InvalidInput("주문 정보가 일치하지 않습니다.".to_string()));
    }
    verify_payment_amount(request.amount, order.amount)?;
    verify_payment_amount(order.amount, event_price)
}

#[derive(Clone)]
#[derive(Debug)]
pub struct SignupService {
    database: Arc<DatabaseService>,
    sessions: Arc<SessionStorage>,
    registrations: RegistrationService,
    payments: PaymentService,
}

impl SignupService {
    pub fn new(
        database: Arc<DatabaseService>,
        sessions: Arc<SessionStorage>,
        registrations: RegistrationService,
        payments: PaymentService,
    ) -> Self {
        Self { database, sessions, registrations, payments }
    }

    /// Decide where a freshly logged-in guest goes next
    pub async fn resolve_login(&self, identity: &KakaoIdentity) -> Result<LoginResolution> {
        let current_event = self.database.events.find_current().await?;

        if let Some(user) = self.database.users.find_by_kakao_id(&identity.kakao_id).await? {
            let Some(event) = current_event else {
                return Ok(LoginResolution::Dashboard { user, registration: None });
            };

            debug!(user_id = user.id, event_id = event.id, "Routing returning user");
            return match self.registrations.find_for(user.id, event.id).await? {
                Some(registration) => Ok(route_registered_user(user, registration)),
                None => {
                    let session = self.start_session_for_user(&user).await?;
                    Ok(LoginResolution::Apply { user, session_id: session.id })
                }
            };
        }

        let prior_rejection = match &current_event {
            Some(event) => self.registrations.check_prior_rejection(&identity.kakao_id, event.id).await?,
            None => RejectionCheck::default(),
        };
        if prior_rejection.was_rejected {
            info!(kakao_id = %identity.kakao_id, "Returning guest was rejected before");
        }

        let session = self.sessions.create(&identity.kakao_id, &identity.name).await?;
        Ok(LoginResolution::NewSignup {
            session_id: session.id,
            kakao_name: identity.name.clone(),
            prior_rejection,
        })
    }

    /// Known users skip the profile step: their draft is their stored profile
    async fn start_session_for_user(&self, user: &User) -> Result<SignupSession> {
        let kakao_id = user.kakao_id.clone().unwrap_or_default();
        let mut session = SignupSession::new(&kakao_id, &user.name, self.sessions.session_ttl_seconds());
        session.set_draft(UserDraft {
            kakao_id,
            name: user.name.clone(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            gender: user.gender,
            age: user.age,
        });
        self.sessions.save(&session).await?;
        Ok(session)
    }

    pub async fn session(&self, session_id: Uuid) -> Result<SignupSession> {
        self.sessions
            .load(session_id)
            .await?
            .ok_or_else(|| PartyGateError::SessionExpired(session_id.to_string()))
    }

    /// Store the guest's profile on the session
    pub async fn save_profile(&self, session_id: Uuid, input: ProfileInput) -> Result<SignupSession> {
        let mut session = self.session(session_id).await?;
        let draft = input.into_draft(&session.kakao_id)?;

        session.set_draft(draft);
        self.sessions.save(&session).await?;
        Ok(session)
    }

    /// Bank transfer path: create the user and a `pending/pending` registration
    pub async fn register_bank_transfer(&self, session_id: Uuid) -> Result<Registration> {
        let session = self.session(session_id).await?;
        let draft = require_draft(&session)?;
        let event = self.registrations.require_current_event().await?;

        let user = self.database.initialize_user(CreateUserRequest::from(draft)).await?;
        let registration = self.registrations.create(NewRegistration::bank_transfer(user.id, event.id)).await?;

        self.sessions.delete(session_id).await?;
        info!(user_id = user.id, event_id = event.id, "Bank transfer registration submitted");
        Ok(registration)
    }

    /// Card path, step one: fix the order the payment widget will charge
    pub async fn create_payment_order(&self, session_id: Uuid) -> Result<PaymentOrder> {
        let mut session = self.session(session_id).await?;
        require_draft(&session)?;
        let event = self.registrations.require_current_event().await?;

        let order = order_for_event(&event);
        session.start_payment(order.clone());
        self.sessions.save(&session).await?;

        debug!(order_id = %order.order_id, amount = order.amount, "Payment order created");
        Ok(order)
    }

    /// Card path, step two: confirm with the gateway, then create the user
    /// and a `completed/pending` registration
    ///
    /// A guest already registered for the event is turned away before the
    /// gateway is called. A payment confirmed earlier for the same order is
    /// reused, so retrying after a failed write never charges twice.
    pub async fn confirm_payment(&self, session_id: Uuid, request: ConfirmRequest) -> Result<PaidRegistration> {
        request.validate()?;
        let mut session = self.session(session_id).await?;
        let draft = require_draft(&session)?;
        let order = session
            .payment_order
            .clone()
            .ok_or_else(|| PartyGateError::InvalidInput("주문 정보를 찾을 수 없습니다. 다시 시도해주세요.".to_string()))?;
        let event = self.registrations.require_current_event().await?;

        check_payment_order(&order, &request, event.price)?;
        self.ensure_not_registered(&session.kakao_id, event.id).await?;

        let result = match session.payment_result.clone() {
            Some(previous) if previous.order_id == order.order_id => {
                info!(order_id = %order.order_id, "Reusing confirmed payment for retried order");
                previous
            }
            _ => {
                let confirmed = self.payments.confirm(&request).await?;
                if let Err(e) = verify_payment_amount(confirmed.total_amount, order.amount) {
                    warn!(order_id = %order.order_id, confirmed = confirmed.total_amount, "Gateway confirmed a different amount");
                    return Err(e);
                }

                let result = PaymentResult {
                    payment_key: confirmed.payment_key,
                    order_id: order.order_id.clone(),
                    amount: confirmed.total_amount,
                    method: confirmed.method,
                    approved_at: confirmed.approved_at,
                };
                session.record_payment(result.clone());
                self.sessions.save(&session).await?;
                result
            }
        };
        let receipt = PaymentReceipt::from(&result);

        let user = self.database.initialize_user(CreateUserRequest::from(draft)).await?;
        let registration = self
            .registrations
            .create(NewRegistration::paid(user.id, event.id, result.payment_key))
            .await?;

        self.sessions.delete(session_id).await?;
        info!(user_id = user.id, event_id = event.id, order_id = %order.order_id, "Card registration submitted");
        Ok(PaidRegistration { registration, receipt })
    }

    async fn ensure_not_registered(&self, kakao_id: &str, event_id: i64) -> Result<()> {
        let Some(user) = self.database.users.find_by_kakao_id(kakao_id).await? else {
            return Ok(());
        };
        if self.registrations.find_for(user.id, event_id).await?.is_some() {
            warn!(user_id = user.id, event_id = event_id, "Payment confirm for an existing registration");
            return Err(PartyGateError::DuplicateRegistration { user_id: user.id, event_id });
        }
        Ok(())
    }
}

fn require_draft(session: &SignupSession) -> Result<UserDraft> {
    session
        .draft
        .clone()
        .ok_or_else(|| PartyGateError::InvalidInput("프로필 정보를 먼저 입력해주세요.".to_string()))
}

fn order_for_event(event: &Event) -> PaymentOrder {
    PaymentOrder::new(event.price, event.title.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::event::fixtures::event;
    use crate::models::{ApprovedRegistration, PendingPayment, PendingRegistration};

    fn profile() -> ProfileInput {
        ProfileInput {
            name: "  김  민수 ".to_string(),
            phone_number: "010-1234-5678".to_string(),
            gender: Gender::Male,
            age: 28,
        }
    }

    fn user() -> User {
        User {
            id: 1,
            kakao_id: Some("k1".to_string()),
            name: "민수".to_string(),
            phone_number: Some("01012345678".to_string()),
            gender: Gender::Male,
            age: 28,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_normalized_into_draft() {
        let draft = profile().into_draft("k1").unwrap();
        assert_eq!(draft.name, "김 민수");
        assert_eq!(draft.phone_number, "01012345678");
        assert_eq!(draft.kakao_id, "k1");
    }

    #[test]
    fn test_profile_validation() {
        let mut bad_phone = profile();
        bad_phone.phone_number = "123".to_string();
        assert!(matches!(bad_phone.into_draft("k1"), Err(PartyGateError::InvalidInput(_))));

        let mut blank = profile();
        blank.name = "   ".to_string();
        assert!(blank.into_draft("k1").is_err());

        let mut age = profile();
        age.age = 0;
        assert!(age.into_draft("k1").is_err());
    }

    #[test]
    fn test_route_registered_user() {
        let now = Utc::now();
        let pending = Registration::Pending(PendingRegistration {
            id: 1,
            user_id: 1,
            event_id: 1,
            payment: PendingPayment::AwaitingTransfer,
            submitted_at: now,
            registered_at: now,
        });
        let approved = Registration::Approved(ApprovedRegistration {
            id: 2,
            user_id: 1,
            event_id: 1,
            payment_id: None,
            submitted_at: now,
            registered_at: now,
            approved_at: now,
        });

        assert!(matches!(
            route_registered_user(user(), approved),
            LoginResolution::Dashboard { registration: Some(_), .. }
        ));
        assert!(matches!(route_registered_user(user(), pending), LoginResolution::Waiting { .. }));
    }

    #[test]
    fn test_check_payment_order() {
        let order = order_for_event(&event(5, 0, 5, 0));
        let request = ConfirmRequest {
            payment_key: "pk".to_string(),
            order_id: order.order_id.clone(),
            amount: 30000,
        };
        assert!(check_payment_order(&order, &request, 30000).is_ok());

        let tampered = ConfirmRequest { amount: 100, ..request.clone() };
        assert!(matches!(
            check_payment_order(&order, &tampered, 30000),
            Err(PartyGateError::InvalidAmount { expected: 30000, actual: 100 })
        ));

        let other_order = ConfirmRequest { order_id: "order_0_000000000".to_string(), ..request.clone() };
        assert!(matches!(check_payment_order(&order, &other_order, 30000), Err(PartyGateError::InvalidInput(_))));

        // Price changed after the order was created
        assert!(matches!(
            check_payment_order(&order, &request, 35000),
            Err(PartyGateError::InvalidAmount { expected: 35000, actual: 30000 })
        ));
    }

    #[test]
    fn test_resolution_wire_format() {
        let resolution = LoginResolution::NewSignup {
            session_id: Uuid::nil(),
            kakao_name: "민수".to_string(),
            prior_rejection: RejectionCheck::default(),
        };
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["next"], "new_signup");
        assert_eq!(json["priorRejection"]["wasRejected"], false);
        assert_eq!(json["sessionId"], "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_payment_receipt_display() {
        let result = PaymentResult {
            payment_key: "pk".to_string(),
            order_id: "order_1".to_string(),
            amount: 30000,
            method: Some("EASY_PAY".to_string()),
            approved_at: None,
        };
        let receipt = PaymentReceipt::from(&result);
        assert_eq!(receipt.amount_text, "30,000원");
        assert_eq!(receipt.method_text.as_deref(), Some("간편결제"));
    }
}
