//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use super::user::Gender;

/// Capacity used for display when an event stores zero slots for a gender
pub const DEFAULT_SLOTS: i32 = 5;

text_enum! {
    /// Event lifecycle status
    pub enum EventStatus {
        Open => "open",
        Full => "full",
        Closed => "closed",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub event_date: DateTime<Utc>,
    /// Free-form time range shown to guests
    pub time_label: String,
    pub location: String,
    pub address: String,
    pub mc_name: String,
    pub description: String,
    pub rules: Vec<String>,
    pub price: i64,
    pub max_male_slots: i32,
    pub max_female_slots: i32,
    pub male_count: i32,
    pub female_count: i32,
    pub participants: Vec<i64>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Male capacity, falling back to the default when unset
    pub fn male_capacity(&self) -> i32 {
        if self.max_male_slots > 0 { self.max_male_slots } else { DEFAULT_SLOTS }
    }

    /// Female capacity, falling back to the default when unset
    pub fn female_capacity(&self) -> i32 {
        if self.max_female_slots > 0 { self.max_female_slots } else { DEFAULT_SLOTS }
    }

    pub fn capacity_for(&self, gender: Gender) -> i32 {
        match gender {
            Gender::Male => self.male_capacity(),
            Gender::Female => self.female_capacity(),
        }
    }

    pub fn count_for(&self, gender: Gender) -> i32 {
        match gender {
            Gender::Male => self.male_count,
            Gender::Female => self.female_count,
        }
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.participants.contains(&user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub event_date: DateTime<Utc>,
    pub time_label: String,
    pub location: String,
    pub address: String,
    pub mc_name: String,
    pub description: String,
    #[serde(default)]
    pub rules: Vec<String>,
    pub price: i64,
    pub max_male_slots: i32,
    pub max_female_slots: i32,
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub time_label: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub max_male_slots: Option<i32>,
    pub max_female_slots: Option<i32>,
    pub status: Option<EventStatus>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn event(max_male: i32, male_count: i32, max_female: i32, female_count: i32) -> Event {
        let now = Utc::now();
        Event {
            id: 1,
            title: "꺄르륵 파티".to_string(),
            event_date: now,
            time_label: "오후 8:00 - 11:00".to_string(),
            location: "강남구 꺄르륵 바".to_string(),
            address: "서울 강남구".to_string(),
            mc_name: "MC".to_string(),
            description: String::new(),
            rules: vec![],
            price: 30000,
            max_male_slots: max_male,
            max_female_slots: max_female,
            male_count,
            female_count,
            participants: vec![],
            status: EventStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}
