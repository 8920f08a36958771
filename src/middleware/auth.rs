//! Authentication middleware
//!
//! Admin routes require the configured bearer token. Signup routes require a
//! gate pass obtained with the event password. Participant routes require a
//! member pass issued to the registered user.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;
use tracing::{debug, warn};
use crate::services::{AccessService, GateClaims, MemberClaims};
use crate::state::AppContext;
use crate::utils::errors::PartyGateError;

/// Header carrying the gate pass
pub const GATE_PASS_HEADER: &str = "x-gate-pass";

/// Header carrying the member pass
pub const MEMBER_PASS_HEADER: &str = "x-member-pass";

/// Token from an `Authorization: Bearer ..` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Check a presented admin token against the configured one
pub fn check_admin_token(presented: Option<&str>, configured: &str) -> Result<(), PartyGateError> {
    match presented {
        Some(token) if !configured.is_empty() && constant_time_eq(token.as_bytes(), configured.as_bytes()) => Ok(()),
        Some(_) => Err(PartyGateError::PermissionDenied("Admin privileges required".to_string())),
        None => Err(PartyGateError::Authentication("Missing admin token".to_string())),
    }
}

pub async fn require_admin(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, PartyGateError> {
    if let Err(e) = check_admin_token(bearer_token(request.headers()), &ctx.settings.admin.token) {
        warn!(path = %request.uri().path(), "Unauthorized admin access attempt");
        return Err(e);
    }

    debug!(path = %request.uri().path(), "Admin authentication successful");
    Ok(next.run(request).await)
}

/// Validate the gate pass and expose its claims to handlers
pub async fn require_gate_pass(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, PartyGateError> {
    let pass = request
        .headers()
        .get(GATE_PASS_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| PartyGateError::Authentication("Gate pass required".to_string()))?;

    let claims: GateClaims = ctx.services.access.validate(pass)?;
    debug!(expires_at = ?AccessService::expires_at(&claims), "Gate pass accepted");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Validate the member pass and expose the user it belongs to
pub async fn require_member_pass(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, PartyGateError> {
    let pass = request
        .headers()
        .get(MEMBER_PASS_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| PartyGateError::Authentication("Member pass required".to_string()))?;

    let claims: MemberClaims = ctx.services.access.validate_member(pass)?;
    debug!(user_id = claims.user_id, path = %request.uri().path(), "Member pass accepted");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret-token"));
        assert_eq!(bearer_token(&headers), Some("secret-token"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_check_admin_token() {
        assert!(check_admin_token(Some("admin"), "admin").is_ok());
        assert!(matches!(
            check_admin_token(Some("guess"), "admin"),
            Err(PartyGateError::PermissionDenied(_))
        ));
        assert!(matches!(check_admin_token(None, "admin"), Err(PartyGateError::Authentication(_))));
        assert!(check_admin_token(Some(""), "").is_err());
    }

    #[test]
    fn test_admin_token_prefixes_do_not_match() {
        for presented in ["admin-token", "admin-token-0", "dmin-token-01", "ADMIN-TOKEN-01"] {
            assert!(matches!(
                check_admin_token(Some(presented), "admin-token-01"),
                Err(PartyGateError::PermissionDenied(_))
            ));
        }
        assert!(check_admin_token(Some("admin-token-01"), "admin-token-01").is_ok());
    }
}
