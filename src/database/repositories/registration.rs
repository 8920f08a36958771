//! Registration repository implementation

use sqlx::{FromRow, PgConnection, PgPool};
use chrono::{DateTime, Utc};
use crate::database::connection::is_unique_violation;
use crate::models::registration::{
    ApprovalStatus, NewRegistration, PaymentStatus, Registration, RegistrationRecord, RegistrationWithUser,
};
use crate::models::user::{Gender, User};
use crate::utils::errors::PartyGateError;

const REGISTRATION_COLUMNS: &str =
    "id, user_id, event_id, payment_status, approval_status, payment_id, submitted_at, registered_at, updated_at";

/// Registration joined with its user, as returned by the listing query
#[derive(Debug, FromRow)]
struct RegistrationUserRow {
    registration_id: i64,
    submitted_at: DateTime<Utc>,
    approval_status: ApprovalStatus,
    payment_status: PaymentStatus,
    user_id: i64,
    kakao_id: Option<String>,
    name: String,
    phone_number: Option<String>,
    gender: Gender,
    age: i32,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl From<RegistrationUserRow> for RegistrationWithUser {
    fn from(row: RegistrationUserRow) -> Self {
        Self {
            registration_id: row.registration_id,
            user: User {
                id: row.user_id,
                kakao_id: row.kakao_id,
                name: row.name,
                phone_number: row.phone_number,
                gender: row.gender,
                age: row.age,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
            submitted_at: row.submitted_at,
            approval_status: row.approval_status,
            payment_status: row.payment_status,
        }
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending registration
    ///
    /// A second registration for the same (user, event) pair violates the
    /// table's unique constraint and is reported as a duplicate.
    pub async fn create(&self, request: NewRegistration) -> Result<Registration, PartyGateError> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO registrations (user_id, event_id, payment_status, approval_status, payment_id,
                                       submitted_at, registered_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6, $6)
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );
        let record = sqlx::query_as::<_, RegistrationRecord>(&sql)
            .bind(request.user_id)
            .bind(request.event_id)
            .bind(request.payment.status())
            .bind(ApprovalStatus::Pending)
            .bind(request.payment.payment_id())
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PartyGateError::DuplicateRegistration {
                        user_id: request.user_id,
                        event_id: request.event_id,
                    }
                } else {
                    PartyGateError::Database(e)
                }
            })?;

        Registration::try_from(record)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, PartyGateError> {
        let sql = format!("SELECT {} FROM registrations WHERE id = $1", REGISTRATION_COLUMNS);
        let record = sqlx::query_as::<_, RegistrationRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Registration::try_from).transpose()
    }

    /// Find the registration of a user for an event
    pub async fn find_by_user_event(&self, user_id: i64, event_id: i64) -> Result<Option<Registration>, PartyGateError> {
        let mut conn = self.pool.acquire().await?;
        let record = Self::find_by_user_event_in(&mut conn, user_id, event_id).await?;
        record.map(Registration::try_from).transpose()
    }

    /// Find the registration row of a user for an event, locking it
    pub async fn find_by_user_event_in(
        conn: &mut PgConnection,
        user_id: i64,
        event_id: i64,
    ) -> Result<Option<RegistrationRecord>, PartyGateError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE user_id = $1 AND event_id = $2 FOR UPDATE",
            REGISTRATION_COLUMNS
        );
        let record = sqlx::query_as::<_, RegistrationRecord>(&sql)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(conn)
            .await?;

        Ok(record)
    }

    /// Find a registration row by ID, locking it
    pub async fn lock_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<RegistrationRecord>, PartyGateError> {
        let sql = format!("SELECT {} FROM registrations WHERE id = $1 FOR UPDATE", REGISTRATION_COLUMNS);
        let record = sqlx::query_as::<_, RegistrationRecord>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(record)
    }

    /// Mark a registration approved with completed payment
    pub async fn set_approved(conn: &mut PgConnection, id: i64) -> Result<RegistrationRecord, PartyGateError> {
        let sql = format!(
            r#"
            UPDATE registrations
            SET approval_status = $2, payment_status = $3, updated_at = $4
            WHERE id = $1
            RETURNING {}
            "#,
            REGISTRATION_COLUMNS
        );
        let record = sqlx::query_as::<_, RegistrationRecord>(&sql)
            .bind(id)
            .bind(ApprovalStatus::Approved)
            .bind(PaymentStatus::Completed)
            .bind(Utc::now())
            .fetch_optional(conn)
            .await?;

        record.ok_or_else(|| PartyGateError::registration_not_found(id))
    }

    /// Delete registration
    pub async fn delete_in(conn: &mut PgConnection, id: i64) -> Result<(), PartyGateError> {
        sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Registrations of an event with the given approval status, joined with users
    ///
    /// Pending registrations come oldest first (review queue); other statuses
    /// newest first.
    pub async fn list_by_event_status(
        &self,
        event_id: i64,
        status: ApprovalStatus,
    ) -> Result<Vec<RegistrationWithUser>, PartyGateError> {
        let order = match status {
            ApprovalStatus::Pending => "ASC",
            _ => "DESC",
        };
        let sql = format!(
            r#"
            SELECT r.id AS registration_id, r.submitted_at, r.approval_status, r.payment_status,
                   u.id AS user_id, u.kakao_id, u.name, u.phone_number, u.gender, u.age,
                   u.created_at AS user_created_at, u.updated_at AS user_updated_at
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1 AND r.approval_status = $2
            ORDER BY r.submitted_at {}, r.id {}
            "#,
            order, order
        );
        let rows = sqlx::query_as::<_, RegistrationUserRow>(&sql)
            .bind(event_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(RegistrationWithUser::from).collect())
    }

    /// Count registrations per (approval status, gender) for an event
    pub async fn count_by_status_and_gender(
        &self,
        event_id: i64,
    ) -> Result<Vec<(ApprovalStatus, Gender, i64)>, PartyGateError> {
        let rows = sqlx::query_as::<_, (ApprovalStatus, Gender, i64)>(
            r#"
            SELECT r.approval_status, u.gender, COUNT(*)
            FROM registrations r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.event_id = $1
            GROUP BY r.approval_status, u.gender
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
