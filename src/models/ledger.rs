//! Event membership ledger
//!
//! The participant list and the per-gender counters of an event. The
//! in-memory operations here define the semantics; the event repository
//! applies the same rules as single atomic SQL statements.

use serde::{Deserialize, Serialize};
use super::event::Event;
use super::user::Gender;

/// How a participant removal adjusts the gender counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Decrement only when the user was on the participant list
    MembershipGuarded,
    /// Always decrement, whether or not the user was ever counted
    Unconditional,
}

impl RemovalPolicy {
    pub fn from_legacy_flag(legacy_cancel_accounting: bool) -> Self {
        if legacy_cancel_accounting {
            RemovalPolicy::Unconditional
        } else {
            RemovalPolicy::MembershipGuarded
        }
    }
}

/// Outcome of a ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerChange {
    /// Whether the participant list changed
    pub membership_changed: bool,
    /// Signed change applied to the gender counter
    pub count_delta: i32,
}

impl LedgerChange {
    pub const NONE: LedgerChange = LedgerChange { membership_changed: false, count_delta: 0 };
}

impl Event {
    /// Append the user and bump their gender counter, unless already present
    pub fn add_participant(&mut self, user_id: i64, gender: Gender) -> LedgerChange {
        if self.is_participant(user_id) {
            return LedgerChange::NONE;
        }

        self.participants.push(user_id);
        *self.counter_mut(gender) += 1;
        LedgerChange { membership_changed: true, count_delta: 1 }
    }

    /// Drop the user from the participant list and adjust their gender counter
    pub fn remove_participant(&mut self, user_id: i64, gender: Gender, policy: RemovalPolicy) -> LedgerChange {
        let was_member = self.is_participant(user_id);
        self.participants.retain(|id| *id != user_id);

        let decrement = match policy {
            RemovalPolicy::MembershipGuarded => was_member,
            RemovalPolicy::Unconditional => true,
        };
        if decrement {
            *self.counter_mut(gender) -= 1;
        }

        LedgerChange {
            membership_changed: was_member,
            count_delta: if decrement { -1 } else { 0 },
        }
    }

    fn counter_mut(&mut self, gender: Gender) -> &mut i32 {
        match gender {
            Gender::Male => &mut self.male_count,
            Gender::Female => &mut self.female_count,
        }
    }
}
