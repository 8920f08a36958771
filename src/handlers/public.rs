//! Handlers reachable without a gate pass

use std::net::SocketAddr;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::models::MenuItem;
use crate::services::kakao::callback_redirect;
use crate::services::payment::payment_error_message;
use crate::services::{CurrentEvent, GatePass, ServiceHealthStatus};
use crate::state::AppContext;
use super::{client_key, ok, ApiResult};

pub async fn health(State(ctx): State<AppContext>) -> (StatusCode, Json<ServiceHealthStatus>) {
    let status = ctx.services.health_check().await;
    if !status.is_healthy() {
        warn!(issues = ?status.get_issues(), "Health check failed");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status));
    }
    (StatusCode::OK, Json(status))
}

#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub password: String,
}

/// Exchange the event password for a gate pass
pub async fn enter(
    State(ctx): State<AppContext>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<AccessRequest>,
) -> ApiResult<GatePass> {
    let client = client_key(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        ctx.settings.server.trust_forwarded_for,
    );
    ok(ctx.services.access.verify(&client, &request.password)?)
}

/// Event guests currently sign up for; `null` when none is open or full
pub async fn current_event(State(ctx): State<AppContext>) -> ApiResult<Option<CurrentEvent>> {
    ok(ctx.services.registration.current_event().await?)
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeUrl {
    pub url: String,
}

pub async fn kakao_authorize_url(
    State(ctx): State<AppContext>,
    Query(query): Query<AuthorizeQuery>,
) -> ApiResult<AuthorizeUrl> {
    let url = ctx.services.kakao.authorize_url(query.state.as_deref())?;
    ok(AuthorizeUrl { url })
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Kakao redirect target; forwards the code to the frontend auth page
pub async fn kakao_callback(Query(query): Query<CallbackQuery>) -> Redirect {
    debug!(has_code = query.code.is_some(), error = ?query.error, "Kakao callback received");
    Redirect::to(&callback_redirect(query.code.as_deref(), query.error.as_deref()))
}

pub async fn menu(State(ctx): State<AppContext>) -> ApiResult<Vec<MenuItem>> {
    ok(ctx.services.questionnaire.menu().await?)
}

#[derive(Debug, Deserialize)]
pub struct PaymentErrorQuery {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentErrorMessage {
    pub code: String,
    pub message: &'static str,
}

/// User-facing message for a gateway failure code from the fail redirect
pub async fn payment_error(Query(query): Query<PaymentErrorQuery>) -> ApiResult<PaymentErrorMessage> {
    let message = payment_error_message(&query.code);
    ok(PaymentErrorMessage { code: query.code, message })
}
