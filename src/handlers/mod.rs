//! HTTP handlers module
//!
//! Handlers are grouped by audience:
//! - Public handlers reachable without a gate pass
//! - Signup handlers for guests holding a gate pass
//! - Participant handlers for registered users holding a member pass
//! - Admin handlers behind the admin token

pub mod admin;
pub mod error;
pub mod participant;
pub mod public;
pub mod signup;

use std::net::SocketAddr;
use axum::{
    http::HeaderMap,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use crate::middleware::{require_admin, require_gate_pass, require_member_pass};
use crate::state::AppContext;
use crate::utils::errors::PartyGateError;

/// Success envelope for JSON responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, PartyGateError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse { success: true, data }))
}

/// Rate limit key of a client
///
/// The peer address, unless the server sits behind a trusted proxy; then the
/// hop that proxy appended last to `x-forwarded-for`. Earlier hops come from
/// the client and are ignored.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded_for: bool) -> String {
    let forwarded = trust_forwarded_for
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit(',').map(str::trim).find(|ip| !ip.is_empty()))
        .map(str::to_string);

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Build the application router
pub fn router(ctx: AppContext) -> Router {
    let gated = Router::new()
        .route("/api/auth/kakao", post(signup::kakao_login))
        .route("/api/signup/:session_id", get(signup::get_session))
        .route("/api/signup/:session_id/profile", put(signup::save_profile))
        .route("/api/signup/:session_id/bank-transfer", post(signup::bank_transfer))
        .route("/api/signup/:session_id/payment-order", post(signup::payment_order))
        .route("/api/signup/:session_id/payment-confirm", post(signup::payment_confirm))
        .route("/api/questions", get(participant::questions))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_gate_pass));

    let member = Router::new()
        .route(
            "/api/questionnaire/:user_id/:event_id",
            get(participant::get_answers).put(participant::save_answers),
        )
        .route(
            "/api/registrations/:user_id/:event_id",
            get(participant::get_registration).delete(participant::cancel_registration),
        )
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_member_pass));

    let admin = Router::new()
        .route("/api/admin/events", get(admin::list_events).post(admin::create_event))
        .route(
            "/api/admin/events/:event_id",
            put(admin::update_event).delete(admin::delete_event),
        )
        .route("/api/admin/events/:event_id/pending", get(admin::pending_registrations))
        .route("/api/admin/events/:event_id/registrations", get(admin::registrations_by_status))
        .route("/api/admin/events/:event_id/stats", get(admin::event_stats))
        .route("/api/admin/events/:event_id/report", get(admin::participant_report))
        .route("/api/admin/events/:event_id/answers", get(admin::event_answers))
        .route("/api/admin/events/:event_id/rejections", get(admin::event_rejections))
        .route("/api/admin/registrations/:registration_id/approve", post(admin::approve_registration))
        .route("/api/admin/registrations/:registration_id/reject", post(admin::reject_registration))
        .route("/api/admin/questions", post(admin::create_question))
        .route("/api/admin/questions/:question_id", delete(admin::delete_question))
        .route("/api/admin/menu", post(admin::create_menu_item))
        .route("/api/admin/menu/:item_id", delete(admin::delete_menu_item))
        .route_layer(middleware::from_fn_with_state(ctx.clone(), require_admin));

    Router::new()
        .route("/health", get(public::health))
        .route("/api/access", post(public::enter))
        .route("/api/events/current", get(public::current_event))
        .route("/api/auth/kakao/url", get(public::kakao_authorize_url))
        .route("/api/auth/kakao/callback", get(public::kakao_callback))
        .route("/api/menu", get(public::menu))
        .route("/api/payments/error-message", get(public::payment_error))
        .merge(gated)
        .merge(member)
        .merge(admin)
        .with_state(ctx)
}
