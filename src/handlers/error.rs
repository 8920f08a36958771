//! HTTP mapping of [`PartyGateError`]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};
use crate::utils::errors::{ErrorSeverity, PartyGateError};
use crate::utils::logging::log_api_error;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: String,
}

impl PartyGateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PartyGateError::Database(_)
            | PartyGateError::Migration(_)
            | PartyGateError::Redis(_)
            | PartyGateError::Serialization(_)
            | PartyGateError::Io(_)
            | PartyGateError::UrlParse(_)
            | PartyGateError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PartyGateError::Http(_) => StatusCode::BAD_GATEWAY,
            PartyGateError::Jwt(_) | PartyGateError::Authentication(_) | PartyGateError::InvalidPassword => {
                StatusCode::UNAUTHORIZED
            }
            PartyGateError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            PartyGateError::UserNotFound { .. }
            | PartyGateError::EventNotFound { .. }
            | PartyGateError::RegistrationNotFound(_)
            | PartyGateError::QuestionNotFound { .. }
            | PartyGateError::MenuItemNotFound { .. } => StatusCode::NOT_FOUND,
            PartyGateError::DuplicateRegistration { .. } | PartyGateError::InvalidStateTransition { .. } => {
                StatusCode::CONFLICT
            }
            PartyGateError::InvalidAmount { .. } | PartyGateError::Payment { .. } | PartyGateError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            PartyGateError::SessionExpired(_) => StatusCode::GONE,
            PartyGateError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            PartyGateError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable code sent to clients
    pub fn error_code(&self) -> String {
        let code = match self {
            PartyGateError::Database(_) | PartyGateError::Migration(_) => "DATABASE_ERROR",
            PartyGateError::Redis(_) => "SESSION_STORE_ERROR",
            PartyGateError::Http(_) => "UPSTREAM_ERROR",
            PartyGateError::Serialization(_) | PartyGateError::Io(_) | PartyGateError::UrlParse(_) => "INTERNAL_ERROR",
            PartyGateError::Config(_) => "CONFIGURATION_ERROR",
            PartyGateError::Jwt(_) => "INVALID_GATE_PASS",
            PartyGateError::UserNotFound { .. } => "USER_NOT_FOUND",
            PartyGateError::EventNotFound { .. } => "EVENT_NOT_FOUND",
            PartyGateError::RegistrationNotFound(_) => "REGISTRATION_NOT_FOUND",
            PartyGateError::QuestionNotFound { .. } => "QUESTION_NOT_FOUND",
            PartyGateError::MenuItemNotFound { .. } => "MENU_ITEM_NOT_FOUND",
            PartyGateError::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
            PartyGateError::InvalidAmount { .. } => "INVALID_AMOUNT",
            PartyGateError::Payment { code, .. } => return code.clone(),
            PartyGateError::Authentication(_) => "UNAUTHENTICATED",
            PartyGateError::PermissionDenied(_) => "FORBIDDEN",
            PartyGateError::InvalidPassword => "INVALID_PASSWORD",
            PartyGateError::SessionExpired(_) => "SESSION_EXPIRED",
            PartyGateError::InvalidStateTransition { .. } => "INVALID_STATE",
            PartyGateError::RateLimitExceeded => "RATE_LIMITED",
            PartyGateError::InvalidInput(_) => "INVALID_INPUT",
            PartyGateError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        };
        code.to_string()
    }

    /// Message shown to clients; internal failures are not described
    pub fn public_message(&self) -> String {
        match self {
            PartyGateError::Database(_)
            | PartyGateError::Migration(_)
            | PartyGateError::Redis(_)
            | PartyGateError::Serialization(_)
            | PartyGateError::Io(_)
            | PartyGateError::UrlParse(_)
            | PartyGateError::Config(_) => "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.".to_string(),
            PartyGateError::Payment { message, .. } => message.clone(),
            PartyGateError::InvalidInput(message) => message.clone(),
            PartyGateError::InvalidPassword => "비밀번호가 올바르지 않습니다.".to_string(),
            PartyGateError::RateLimitExceeded => "시도 횟수를 초과했습니다. 잠시 후 다시 시도해주세요.".to_string(),
            PartyGateError::SessionExpired(_) => "세션이 만료되었습니다. 다시 로그인해주세요.".to_string(),
            PartyGateError::DuplicateRegistration { .. } => "이미 신청한 이벤트입니다.".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for PartyGateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() || self.severity() == ErrorSeverity::Critical {
            error!(status = %status, severity = %self.severity(), error = %self, "Request failed");
        } else if let PartyGateError::Payment { code, .. } = &self {
            log_api_error("toss", &self.to_string(), Some(code));
        } else if self.is_not_found() {
            debug!(status = %status, error = %self, "Resource not found");
        } else {
            warn!(status = %status, recoverable = self.is_recoverable(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            message: self.public_message(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}
