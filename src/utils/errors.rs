//! Error handling for PartyGate
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for PartyGate application
#[derive(Error, Debug)]
pub enum PartyGateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found: {0}")]
    RegistrationNotFound(String),

    #[error("Question not found: {question_id}")]
    QuestionNotFound { question_id: i64 },

    #[error("Menu item not found: {item_id}")]
    MenuItemNotFound { item_id: i64 },

    #[error("Registration already exists for user {user_id} and event {event_id}")]
    DuplicateRegistration { user_id: i64, event_id: i64 },

    #[error("Payment amount mismatch: expected {expected}, got {actual}")]
    InvalidAmount { expected: i64, actual: i64 },

    #[error("Payment error [{code}]: {message}")]
    Payment { code: String, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid event password")]
    InvalidPassword,

    #[error("Signup session expired or missing: {0}")]
    SessionExpired(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for PartyGate operations
pub type Result<T> = std::result::Result<T, PartyGateError>;

impl PartyGateError {
    /// Registration lookup failure keyed by registration id
    pub fn registration_not_found(registration_id: i64) -> Self {
        PartyGateError::RegistrationNotFound(format!("id {}", registration_id))
    }

    /// Registration lookup failure keyed by the (user, event) pair
    pub fn registration_not_found_for(user_id: i64, event_id: i64) -> Self {
        PartyGateError::RegistrationNotFound(format!("user {} / event {}", user_id, event_id))
    }

    /// Check if the error is one of the not-found kinds
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PartyGateError::UserNotFound { .. }
                | PartyGateError::EventNotFound { .. }
                | PartyGateError::RegistrationNotFound(_)
                | PartyGateError::QuestionNotFound { .. }
                | PartyGateError::MenuItemNotFound { .. }
        )
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PartyGateError::Database(_) => false,
            PartyGateError::Migration(_) => false,
            PartyGateError::Redis(_) => true,
            PartyGateError::Http(_) => true,
            PartyGateError::Serialization(_) => false,
            PartyGateError::Io(_) => true,
            PartyGateError::UrlParse(_) => false,
            PartyGateError::Jwt(_) => false,
            PartyGateError::Config(_) => false,
            PartyGateError::UserNotFound { .. } => false,
            PartyGateError::EventNotFound { .. } => false,
            PartyGateError::RegistrationNotFound(_) => false,
            PartyGateError::QuestionNotFound { .. } => false,
            PartyGateError::MenuItemNotFound { .. } => false,
            PartyGateError::DuplicateRegistration { .. } => false,
            PartyGateError::InvalidAmount { .. } => false,
            PartyGateError::Payment { .. } => true,
            PartyGateError::Authentication(_) => true,
            PartyGateError::PermissionDenied(_) => false,
            PartyGateError::InvalidPassword => true,
            PartyGateError::SessionExpired(_) => false,
            PartyGateError::InvalidStateTransition { .. } => false,
            PartyGateError::RateLimitExceeded => true,
            PartyGateError::InvalidInput(_) => false,
            PartyGateError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PartyGateError::Database(_) => ErrorSeverity::Critical,
            PartyGateError::Migration(_) => ErrorSeverity::Critical,
            PartyGateError::Config(_) => ErrorSeverity::Critical,
            PartyGateError::PermissionDenied(_) => ErrorSeverity::Warning,
            PartyGateError::Authentication(_) => ErrorSeverity::Warning,
            PartyGateError::InvalidPassword => ErrorSeverity::Warning,
            PartyGateError::RateLimitExceeded => ErrorSeverity::Warning,
            PartyGateError::InvalidAmount { .. } => ErrorSeverity::Warning,
            PartyGateError::InvalidInput(_) => ErrorSeverity::Info,
            PartyGateError::DuplicateRegistration { .. } => ErrorSeverity::Info,
            PartyGateError::SessionExpired(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_kinds() {
        assert!(PartyGateError::UserNotFound { user_id: 1 }.is_not_found());
        assert!(PartyGateError::EventNotFound { event_id: 1 }.is_not_found());
        assert!(PartyGateError::registration_not_found(7).is_not_found());
        assert!(!PartyGateError::RateLimitExceeded.is_not_found());
    }

    #[test]
    fn test_severity_and_display() {
        let err = PartyGateError::InvalidAmount { expected: 30000, actual: 100 };
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.to_string(), "Payment amount mismatch: expected 30000, got 100");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");

        let dup = PartyGateError::DuplicateRegistration { user_id: 3, event_id: 9 };
        assert!(!dup.is_recoverable());
        assert_eq!(
            PartyGateError::registration_not_found_for(3, 9).to_string(),
            "Registration not found: user 3 / event 9"
        );
    }
}
