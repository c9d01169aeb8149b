use crate::domain::{models::agent::Agent, ports::AgentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteAgentRepo {
    pool: SqlitePool,
}

impl SqliteAgentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for SqliteAgentRepo {
    async fn create(&self, agent: &Agent) -> Result<Agent, AppError> {
        sqlx::query_as::<_, Agent>(
            "INSERT INTO agents (id, name, email, phone, bio, photo_url, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&agent.id)
            .bind(&agent.name)
            .bind(&agent.email)
            .bind(&agent.phone)
            .bind(&agent.bio)
            .bind(&agent.photo_url)
            .bind(agent.is_active)
            .bind(agent.created_at)
            .bind(agent.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Agent>, AppError> {
        sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Agent>, AppError> {
        let query = if active_only {
            "SELECT * FROM agents WHERE is_active = TRUE ORDER BY name ASC"
        } else {
            "SELECT * FROM agents ORDER BY name ASC"
        };
        sqlx::query_as::<_, Agent>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, agent: &Agent) -> Result<Agent, AppError> {
        sqlx::query_as::<_, Agent>(
            "UPDATE agents SET name=?, email=?, phone=?, bio=?, photo_url=?, is_active=?, updated_at=? WHERE id=? RETURNING *"
        )
            .bind(&agent.name)
            .bind(&agent.email)
            .bind(&agent.phone)
            .bind(&agent.bio)
            .bind(&agent.photo_url)
            .bind(agent.is_active)
            .bind(Utc::now())
            .bind(&agent.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Agent not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM agents")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
