//! Display-only capacity figures derived from an event's counters

use serde::{Deserialize, Serialize};
use super::event::{Event, EventStatus};
use super::user::Gender;

/// Advisory slot view of an event. Nothing in the registration flow is gated
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotStatus {
    pub male_slots: i32,
    pub female_slots: i32,
    pub total_slots: i32,
    pub available_male_slots: i32,
    pub available_female_slots: i32,
    pub can_join: bool,
}

impl SlotStatus {
    pub fn for_event(event: &Event) -> Self {
        let male_slots = event.male_capacity();
        let female_slots = event.female_capacity();
        let available_male_slots = male_slots - event.male_count;
        let available_female_slots = female_slots - event.female_count;

        Self {
            male_slots,
            female_slots,
            total_slots: male_slots + female_slots,
            available_male_slots,
            available_female_slots,
            can_join: (available_male_slots > 0 || available_female_slots > 0)
                && event.status == EventStatus::Open,
        }
    }

    pub fn available_for(&self, gender: Gender) -> i32 {
        match gender {
            Gender::Male => self.available_male_slots,
            Gender::Female => self.available_female_slots,
        }
    }
}

impl Event {
    pub fn slot_status(&self) -> SlotStatus {
        SlotStatus::for_event(self)
    }
}
