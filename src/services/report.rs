//! Admin dashboard figures and the participant report

use std::collections::HashMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{AnswerSummary, ApprovalStatus, Event, Gender, RegistrationWithUser, StructuredAnswer, User};
use crate::utils::errors::{PartyGateError, Result};

/// Registration figures for one gender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderStats {
    pub approved: i64,
    pub pending: i64,
    pub max_slots: i64,
    /// May go negative when pending applications exceed the free slots
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub event_id: i64,
    pub male: GenderStats,
    pub female: GenderStats,
}

/// Approved participant together with their questionnaire answers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReport {
    pub registration_id: i64,
    pub user: User,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub answers: Vec<StructuredAnswer>,
}

/// Tally grouped registration counts against the event's capacity
pub fn tally_stats(event: &Event, counts: &[(ApprovalStatus, Gender, i64)]) -> EventStats {
    let mut male = GenderStats { max_slots: i64::from(event.male_capacity()), ..Default::default() };
    let mut female = GenderStats { max_slots: i64::from(event.female_capacity()), ..Default::default() };

    for &(status, gender, count) in counts {
        let stats = match gender {
            Gender::Male => &mut male,
            Gender::Female => &mut female,
        };
        match status {
            ApprovalStatus::Approved => stats.approved += count,
            ApprovalStatus::Pending => stats.pending += count,
            // Rejected rows are deleted; a stray one does not hold a slot
            ApprovalStatus::Rejected => {}
        }
    }

    for stats in [&mut male, &mut female] {
        stats.remaining = stats.max_slots - stats.approved - stats.pending;
    }

    EventStats { event_id: event.id, male, female }
}

/// Join approved registrations with answers, newest submission first
pub fn build_report(mut approved: Vec<RegistrationWithUser>, answers: Vec<AnswerSummary>) -> Vec<ParticipantReport> {
    let mut by_user: HashMap<i64, Vec<StructuredAnswer>> = answers
        .into_iter()
        .map(|summary| (summary.user_id, summary.answers.0))
        .collect();

    approved.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    approved
        .into_iter()
        .map(|registration| ParticipantReport {
            registration_id: registration.registration_id,
            answers: by_user.remove(&registration.user.id).unwrap_or_default(),
            user: registration.user,
            submitted_at: registration.submitted_at,
        })
        .collect()
}

#[derive(Clone)]
#[derive(Debug)]
pub struct ReportService {
    database: Arc<DatabaseService>,
}

impl ReportService {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self { database }
    }

    pub async fn event_stats(&self, event_id: i64) -> Result<EventStats> {
        let (event, counts) = futures::try_join!(
            self.database.events.find_by_id(event_id),
            self.database.registrations.count_by_status_and_gender(event_id),
        )?;
        let event = event.ok_or(PartyGateError::EventNotFound { event_id })?;

        let stats = tally_stats(&event, &counts);
        debug!(
            event_id = event_id,
            male_remaining = stats.male.remaining,
            female_remaining = stats.female.remaining,
            "Computed event stats"
        );
        Ok(stats)
    }

    pub async fn participant_report(&self, event_id: i64) -> Result<Vec<ParticipantReport>> {
        if self.database.events.find_by_id(event_id).await?.is_none() {
            return Err(PartyGateError::EventNotFound { event_id });
        }

        let (approved, answers) = futures::try_join!(
            self.database.registrations.list_by_event_status(event_id, ApprovalStatus::Approved),
            self.database.answers.all_for_event(event_id),
        )?;
        Ok(build_report(approved, answers))
    }
}
