//! Rejection history model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Reason tag written when an admin rejects a registration
pub const REASON_ADMIN_REJECTED: &str = "admin_rejected";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRecord {
    pub id: i64,
    pub kakao_id: Option<String>,
    pub event_id: i64,
    pub user_name: String,
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRejectionRequest {
    pub kakao_id: Option<String>,
    pub event_id: i64,
    pub user_name: String,
    pub reason: String,
}

/// Result of looking up a prior rejection. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionCheck {
    pub was_rejected: bool,
    pub rejected_at: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub reason: Option<String>,
}

impl From<Option<RejectionRecord>> for RejectionCheck {
    fn from(record: Option<RejectionRecord>) -> Self {
        match record {
            Some(record) => Self {
                was_rejected: true,
                rejected_at: Some(record.rejected_at),
                user_name: Some(record.user_name),
                reason: Some(record.reason),
            },
            None => Self::default(),
        }
    }
}
