//! Menu repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::menu::MenuItem;
use crate::utils::errors::PartyGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<MenuItem>, PartyGateError> {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT id, name, created_at FROM menu_items ORDER BY name ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn create(&self, name: &str) -> Result<MenuItem, PartyGateError> {
        let item = sqlx::query_as::<_, MenuItem>(
            "INSERT INTO menu_items (name, created_at) VALUES ($1, $2) RETURNING id, name, created_at"
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Delete a menu item; returns whether it existed
    pub async fn delete(&self, id: i64) -> Result<bool, PartyGateError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
