//! User model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

text_enum! {
    /// Gender used for per-gender slot accounting
    pub enum Gender {
        Male => "male",
        Female => "female",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Absent for admin-seeded users
    pub kakao_id: Option<String>,
    pub name: String,
    pub phone_number: Option<String>,
    pub gender: Gender,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub kakao_id: Option<String>,
    pub name: String,
    pub phone_number: Option<String>,
    pub gender: Gender,
    pub age: i32,
}

/// Profile collected during signup, before any user record exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub kakao_id: String,
    pub name: String,
    pub phone_number: String,
    pub gender: Gender,
    pub age: i32,
}

impl From<UserDraft> for CreateUserRequest {
    fn from(draft: UserDraft) -> Self {
        Self {
            kakao_id: Some(draft.kakao_id),
            name: draft.name,
            phone_number: Some(draft.phone_number),
            gender: draft.gender,
            age: draft.age,
        }
    }
}
