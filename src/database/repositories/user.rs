//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::PartyGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, PartyGateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (kakao_id, name, phone_number, gender, age, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, kakao_id, name, phone_number, gender, age, created_at, updated_at
            "#
        )
        .bind(request.kakao_id)
        .bind(request.name)
        .bind(request.phone_number)
        .bind(request.gender)
        .bind(request.age)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, PartyGateError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Find user by ID on an existing connection
    pub async fn find_by_id_in(conn: &mut PgConnection, id: i64) -> Result<Option<User>, PartyGateError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, kakao_id, name, phone_number, gender, age, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Find user by Kakao ID
    pub async fn find_by_kakao_id(&self, kakao_id: &str) -> Result<Option<User>, PartyGateError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, kakao_id, name, phone_number, gender, age, created_at, updated_at FROM users WHERE kakao_id = $1"
        )
        .bind(kakao_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete user
    pub async fn delete_in(conn: &mut PgConnection, id: i64) -> Result<(), PartyGateError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(())
    }

    /// List users with pagination
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, PartyGateError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, kakao_id, name, phone_number, gender, age, created_at, updated_at FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
