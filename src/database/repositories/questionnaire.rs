//! Question and questionnaire answer repositories

use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;
use chrono::Utc;
use crate::models::questionnaire::{Question, CreateQuestionRequest, StructuredAnswer, QuestionnaireAnswers, AnswerSummary};
use crate::utils::errors::PartyGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All questions in display order
    pub async fn list(&self) -> Result<Vec<Question>, PartyGateError> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, kind, title, subtitle, required, sort_order FROM questions ORDER BY sort_order ASC, id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    pub async fn create(&self, request: CreateQuestionRequest) -> Result<Question, PartyGateError> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (kind, title, subtitle, required, sort_order, created_at)
            VALUES ('text', $1, $2, $3, $4, $5)
            RETURNING id, kind, title, subtitle, required, sort_order
            "#
        )
        .bind(request.title)
        .bind(request.subtitle)
        .bind(request.required)
        .bind(request.sort_order)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    /// Delete a question; returns whether it existed
    pub async fn delete(&self, id: i64) -> Result<bool, PartyGateError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Clone)]
#[derive(Debug)]
pub struct AnswerRepository {
    pool: PgPool,
}

impl AnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the answers of a user for an event
    pub async fn upsert(
        &self,
        user_id: i64,
        event_id: i64,
        answers: Vec<StructuredAnswer>,
        total_questions: i32,
    ) -> Result<QuestionnaireAnswers, PartyGateError> {
        let now = Utc::now();
        let stored = sqlx::query_as::<_, QuestionnaireAnswers>(
            r#"
            INSERT INTO questionnaire_answers (user_id, event_id, answers, total_questions, completed_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id, event_id) DO UPDATE
            SET answers = EXCLUDED.answers,
                total_questions = EXCLUDED.total_questions,
                completed_at = EXCLUDED.completed_at,
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, event_id, answers, total_questions, completed_at, updated_at
            "#
        )
        .bind(user_id)
        .bind(event_id)
        .bind(Json(answers))
        .bind(total_questions)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    pub async fn find(&self, user_id: i64, event_id: i64) -> Result<Option<QuestionnaireAnswers>, PartyGateError> {
        let stored = sqlx::query_as::<_, QuestionnaireAnswers>(
            r#"
            SELECT id, user_id, event_id, answers, total_questions, completed_at, updated_at
            FROM questionnaire_answers
            WHERE user_id = $1 AND event_id = $2
            "#
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Delete the answers of a user for an event, if any
    pub async fn delete_in(conn: &mut PgConnection, user_id: i64, event_id: i64) -> Result<(), PartyGateError> {
        sqlx::query("DELETE FROM questionnaire_answers WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// Every answer set for an event with the answering user's profile
    pub async fn all_for_event(&self, event_id: i64) -> Result<Vec<AnswerSummary>, PartyGateError> {
        let summaries = sqlx::query_as::<_, AnswerSummary>(
            r#"
            SELECT a.id, a.user_id, u.name AS user_name, u.gender AS user_gender, u.age AS user_age,
                   a.answers, a.total_questions, a.completed_at, a.updated_at
            FROM questionnaire_answers a
            INNER JOIN users u ON u.id = a.user_id
            WHERE a.event_id = $1
            ORDER BY a.completed_at ASC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }
}
