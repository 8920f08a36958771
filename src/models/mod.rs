//! Data models module
//!
//! This module contains all data structures used throughout the application

use thiserror::Error;

/// Declares a lowercase string-backed enum stored in a TEXT column
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::InvalidEnumValue;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::InvalidEnumValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub mod user;
pub mod event;
pub mod slots;
pub mod ledger;
pub mod registration;
pub mod rejection;
pub mod questionnaire;
pub mod menu;

/// A TEXT column held a value outside its enum
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} value: {value}")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
}

// Re-export commonly used models
pub use user::{User, Gender, CreateUserRequest, UserDraft};
pub use event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest, DEFAULT_SLOTS};
pub use slots::SlotStatus;
pub use ledger::{LedgerChange, RemovalPolicy};
pub use registration::{
    Registration, RegistrationRecord, PendingRegistration, ApprovedRegistration, PendingPayment,
    PaymentStatus, ApprovalStatus, NewRegistration, RegistrationWithUser,
};
pub use rejection::{RejectionRecord, CreateRejectionRequest, RejectionCheck, REASON_ADMIN_REJECTED};
pub use questionnaire::{Question, CreateQuestionRequest, StructuredAnswer, QuestionnaireAnswers, AnswerSummary};
pub use menu::MenuItem;
