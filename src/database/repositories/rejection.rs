//! Rejection history repository
//!
//! Rows are only ever inserted; nothing here updates or deletes them.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::rejection::{RejectionRecord, CreateRejectionRequest};
use crate::utils::errors::PartyGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct RejectionRepository {
    pool: PgPool,
}

impl RejectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a rejection record
    pub async fn create(&self, request: CreateRejectionRequest) -> Result<RejectionRecord, PartyGateError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_in(&mut conn, request).await
    }

    /// Append a rejection record on an existing connection
    pub async fn create_in(conn: &mut PgConnection, request: CreateRejectionRequest) -> Result<RejectionRecord, PartyGateError> {
        let record = sqlx::query_as::<_, RejectionRecord>(
            r#"
            INSERT INTO rejections (kakao_id, event_id, user_name, reason, rejected_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kakao_id, event_id, user_name, reason, rejected_at
            "#
        )
        .bind(request.kakao_id)
        .bind(request.event_id)
        .bind(request.user_name)
        .bind(request.reason)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(record)
    }

    /// Most recent rejection of a Kakao identity for an event
    pub async fn find_latest(&self, kakao_id: &str, event_id: i64) -> Result<Option<RejectionRecord>, PartyGateError> {
        let record = sqlx::query_as::<_, RejectionRecord>(
            r#"
            SELECT id, kakao_id, event_id, user_name, reason, rejected_at
            FROM rejections
            WHERE kakao_id = $1 AND event_id = $2
            ORDER BY rejected_at DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(kakao_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// All rejections for an event, newest first
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<RejectionRecord>, PartyGateError> {
        let records = sqlx::query_as::<_, RejectionRecord>(
            "SELECT id, kakao_id, event_id, user_name, reason, rejected_at FROM rejections WHERE event_id = $1 ORDER BY rejected_at DESC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
