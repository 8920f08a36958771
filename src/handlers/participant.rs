//! Handlers for registered users: questionnaire, registration view and cancellation
//!
//! Every route keyed by a user id only serves the holder of that user's member pass.

use std::collections::HashMap;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::database::service::CancellationOutcome;
use crate::models::{Question, QuestionnaireAnswers, Registration};
use crate::services::{CurrentEvent, MemberClaims};
use crate::state::AppContext;
use crate::utils::errors::PartyGateError;
use super::{ok, ApiResult};

/// The path user must be the member the pass was issued to
fn ensure_own(member: MemberClaims, user_id: i64) -> Result<(), PartyGateError> {
    if member.user_id == user_id {
        Ok(())
    } else {
        warn!(member = member.user_id, requested = user_id, "Member pass used for another user");
        Err(PartyGateError::PermissionDenied("Not your registration".to_string()))
    }
}

pub async fn questions(State(ctx): State<AppContext>) -> ApiResult<Vec<Question>> {
    ok(ctx.services.questionnaire.questions().await?)
}

#[derive(Debug, Deserialize)]
pub struct SaveAnswersRequest {
    /// Answers keyed by question id
    pub answers: HashMap<i64, String>,
}

pub async fn save_answers(
    State(ctx): State<AppContext>,
    Extension(member): Extension<MemberClaims>,
    Path((user_id, event_id)): Path<(i64, i64)>,
    Json(request): Json<SaveAnswersRequest>,
) -> ApiResult<QuestionnaireAnswers> {
    ensure_own(member, user_id)?;
    ok(ctx.services.questionnaire.save_answers(user_id, event_id, request.answers).await?)
}

pub async fn get_answers(
    State(ctx): State<AppContext>,
    Extension(member): Extension<MemberClaims>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> ApiResult<HashMap<i64, String>> {
    ensure_own(member, user_id)?;
    ok(ctx.services.questionnaire.answers(user_id, event_id).await?)
}

/// A user's registration together with the event it is for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub registration: Registration,
    pub event: CurrentEvent,
}

pub async fn get_registration(
    State(ctx): State<AppContext>,
    Extension(member): Extension<MemberClaims>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> ApiResult<RegistrationView> {
    ensure_own(member, user_id)?;
    let registrations = &ctx.services.registration;
    let registration = registrations
        .find_for(user_id, event_id)
        .await?
        .ok_or_else(|| PartyGateError::registration_not_found_for(user_id, event_id))?;
    let event = registrations.get_event(event_id).await?;

    ok(RegistrationView { registration, event: CurrentEvent::from(event) })
}

/// Cancel a registration; the user record and answers go with it
pub async fn cancel_registration(
    State(ctx): State<AppContext>,
    Extension(member): Extension<MemberClaims>,
    Path((user_id, event_id)): Path<(i64, i64)>,
) -> ApiResult<CancellationOutcome> {
    ensure_own(member, user_id)?;
    ok(ctx.services.registration.cancel(user_id, event_id).await?)
}
