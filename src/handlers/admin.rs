//! Admin dashboard handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::database::service::ApprovalOutcome;
use crate::models::{
    AnswerSummary, ApprovalStatus, CreateEventRequest, CreateQuestionRequest, Event, MenuItem, Question,
    RegistrationWithUser, RejectionRecord, UpdateEventRequest,
};
use crate::services::{EventStats, ParticipantReport};
use crate::state::AppContext;
use super::{ok, ApiResult};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

pub async fn list_events(State(ctx): State<AppContext>, Query(page): Query<Pagination>) -> ApiResult<Vec<Event>> {
    let (limit, offset) = page.bounds();
    ok(ctx.services.registration.list_events(limit, offset).await?)
}

pub async fn create_event(State(ctx): State<AppContext>, Json(request): Json<CreateEventRequest>) -> ApiResult<Event> {
    ok(ctx.services.registration.create_event(request).await?)
}

pub async fn update_event(
    State(ctx): State<AppContext>,
    Path(event_id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> ApiResult<Event> {
    ok(ctx.services.registration.update_event(event_id, request).await?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: i64,
}

pub async fn delete_event(State(ctx): State<AppContext>, Path(event_id): Path<i64>) -> ApiResult<Deleted> {
    ctx.services.registration.delete_event(event_id).await?;
    ok(Deleted { id: event_id })
}

pub async fn pending_registrations(
    State(ctx): State<AppContext>,
    Path(event_id): Path<i64>,
) -> ApiResult<Vec<RegistrationWithUser>> {
    ok(ctx.services.registration.pending(event_id).await?)
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: ApprovalStatus,
}

pub async fn registrations_by_status(
    State(ctx): State<AppContext>,
    Path(event_id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<Vec<RegistrationWithUser>> {
    ok(ctx.services.registration.by_status(event_id, query.status).await?)
}

pub async fn approve_registration(
    State(ctx): State<AppContext>,
    Path(registration_id): Path<i64>,
) -> ApiResult<ApprovalOutcome> {
    ok(ctx.services.registration.approve(registration_id).await?)
}

pub async fn reject_registration(
    State(ctx): State<AppContext>,
    Path(registration_id): Path<i64>,
) -> ApiResult<RejectionRecord> {
    ok(ctx.services.registration.reject(registration_id).await?)
}

pub async fn event_stats(State(ctx): State<AppContext>, Path(event_id): Path<i64>) -> ApiResult<EventStats> {
    ok(ctx.services.report.event_stats(event_id).await?)
}

pub async fn participant_report(
    State(ctx): State<AppContext>,
    Path(event_id): Path<i64>,
) -> ApiResult<Vec<ParticipantReport>> {
    ok(ctx.services.report.participant_report(event_id).await?)
}

pub async fn event_answers(State(ctx): State<AppContext>, Path(event_id): Path<i64>) -> ApiResult<Vec<AnswerSummary>> {
    ok(ctx.services.questionnaire.answers_for_event(event_id).await?)
}

pub async fn event_rejections(
    State(ctx): State<AppContext>,
    Path(event_id): Path<i64>,
) -> ApiResult<Vec<RejectionRecord>> {
    ok(ctx.services.registration.rejections(event_id).await?)
}

pub async fn create_question(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateQuestionRequest>,
) -> ApiResult<Question> {
    ok(ctx.services.questionnaire.create_question(request).await?)
}

pub async fn delete_question(State(ctx): State<AppContext>, Path(question_id): Path<i64>) -> ApiResult<Deleted> {
    ctx.services.questionnaire.delete_question(question_id).await?;
    ok(Deleted { id: question_id })
}

#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub name: String,
}

pub async fn create_menu_item(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateMenuItemRequest>,
) -> ApiResult<MenuItem> {
    ok(ctx.services.questionnaire.create_menu_item(&request.name).await?)
}

pub async fn delete_menu_item(State(ctx): State<AppContext>, Path(item_id): Path<i64>) -> ApiResult<Deleted> {
    ctx.services.questionnaire.delete_menu_item(item_id).await?;
    ok(Deleted { id: item_id })
}
