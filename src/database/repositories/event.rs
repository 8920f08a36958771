//! Event repository implementation
//!
//! Ledger mutations are single `UPDATE` statements: the participant array and
//! the gender counter change together, and membership is checked in the
//! `WHERE` clause of the same statement.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest};
use crate::models::ledger::{LedgerChange, RemovalPolicy};
use crate::models::user::Gender;
use crate::utils::errors::PartyGateError;

const EVENT_COLUMNS: &str = "id, title, event_date, time_label, location, address, mc_name, description, rules, \
    price, max_male_slots, max_female_slots, male_count, female_count, participants, status, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, PartyGateError> {
        let sql = format!(
            r#"
            INSERT INTO events (title, event_date, time_label, location, address, mc_name, description, rules,
                                price, max_male_slots, max_female_slots, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(request.title)
            .bind(request.event_date)
            .bind(request.time_label)
            .bind(request.location)
            .bind(request.address)
            .bind(request.mc_name)
            .bind(request.description)
            .bind(request.rules)
            .bind(request.price)
            .bind(request.max_male_slots)
            .bind(request.max_female_slots)
            .bind(request.status.unwrap_or(EventStatus::Open))
            .bind(Utc::now())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, PartyGateError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Find event by ID on an existing connection
    pub async fn find_by_id_in(conn: &mut PgConnection, id: i64) -> Result<Option<Event>, PartyGateError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(event)
    }

    /// The event guests currently sign up for: first open, else first full
    pub async fn find_current(&self) -> Result<Option<Event>, PartyGateError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM events
            WHERE status IN ('open', 'full')
            ORDER BY CASE status WHEN 'open' THEN 0 ELSE 1 END, created_at ASC, id ASC
            LIMIT 1
            "#,
            EVENT_COLUMNS
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Update event
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, PartyGateError> {
        let sql = format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                event_date = COALESCE($3, event_date),
                time_label = COALESCE($4, time_label),
                location = COALESCE($5, location),
                address = COALESCE($6, address),
                description = COALESCE($7, description),
                price = COALESCE($8, price),
                max_male_slots = COALESCE($9, max_male_slots),
                max_female_slots = COALESCE($10, max_female_slots),
                status = COALESCE($11, status),
                updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(request.title)
            .bind(request.event_date)
            .bind(request.time_label)
            .bind(request.location)
            .bind(request.address)
            .bind(request.description)
            .bind(request.price)
            .bind(request.max_male_slots)
            .bind(request.max_female_slots)
            .bind(request.status)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        event.ok_or(PartyGateError::EventNotFound { event_id: id })
    }

    /// List events, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Event>, PartyGateError> {
        let sql = format!(
            "SELECT {} FROM events ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            EVENT_COLUMNS
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Delete event
    pub async fn delete(&self, id: i64) -> Result<(), PartyGateError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Append a participant and bump their gender counter, unless already listed
    pub async fn add_participant(
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
        gender: Gender,
    ) -> Result<LedgerChange, PartyGateError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET participants = array_append(participants, $3),
                male_count = male_count + CASE WHEN $2 = 'male' THEN 1 ELSE 0 END,
                female_count = female_count + CASE WHEN $2 = 'female' THEN 1 ELSE 0 END,
                updated_at = $4
            WHERE id = $1 AND NOT ($3 = ANY(participants))
            "#
        )
        .bind(event_id)
        .bind(gender)
        .bind(user_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(LedgerChange::NONE);
        }
        Ok(LedgerChange { membership_changed: true, count_delta: 1 })
    }

    /// Remove a participant and decrement their gender counter
    ///
    /// With [`RemovalPolicy::MembershipGuarded`] nothing changes for a user
    /// who is not listed. [`RemovalPolicy::Unconditional`] always decrements
    /// and has no floor at zero.
    pub async fn remove_participant(
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
        gender: Gender,
        policy: RemovalPolicy,
    ) -> Result<LedgerChange, PartyGateError> {
        match policy {
            RemovalPolicy::MembershipGuarded => {
                let result = sqlx::query(
                    r#"
                    UPDATE events
                    SET participants = array_remove(participants, $3),
                        male_count = male_count - CASE WHEN $2 = 'male' THEN 1 ELSE 0 END,
                        female_count = female_count - CASE WHEN $2 = 'female' THEN 1 ELSE 0 END,
                        updated_at = $4
                    WHERE id = $1 AND $3 = ANY(participants)
                    "#
                )
                .bind(event_id)
                .bind(gender)
                .bind(user_id)
                .bind(Utc::now())
                .execute(conn)
                .await?;

                if result.rows_affected() == 0 {
                    return Ok(LedgerChange::NONE);
                }
                Ok(LedgerChange { membership_changed: true, count_delta: -1 })
            }
            RemovalPolicy::Unconditional => {
                let was_member: Option<(bool,)> = sqlx::query_as(
                    r#"
                    WITH before AS (
                        SELECT $3 = ANY(participants) AS was_member
                        FROM events
                        WHERE id = $1
                        FOR UPDATE
                    )
                    UPDATE events
                    SET participants = array_remove(participants, $3),
                        male_count = male_count - CASE WHEN $2 = 'male' THEN 1 ELSE 0 END,
                        female_count = female_count - CASE WHEN $2 = 'female' THEN 1 ELSE 0 END,
                        updated_at = $4
                    FROM before
                    WHERE events.id = $1
                    RETURNING before.was_member
                    "#
                )
                .bind(event_id)
                .bind(gender)
                .bind(user_id)
                .bind(Utc::now())
                .fetch_optional(conn)
                .await?;

                match was_member {
                    Some((was_member,)) => Ok(LedgerChange { membership_changed: was_member, count_delta: -1 }),
                    None => Ok(LedgerChange::NONE),
                }
            }
        }
    }
}
