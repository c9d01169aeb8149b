use crate::domain::{models::agent::Agent, ports::AgentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresAgentRepo {
    pool: PgPool,
}

impl PostgresAgentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentRepository for PostgresAgentRepo {
    async fn create(&self, agent: &Agent) -> Result<Agent, AppError> {
        sqlx::query_as::<_, Agent>(
            "INSERT INTO agents (id, name, email, phone, bio, photo_url, is_active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *"
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
        sqlx::query_as::<_, Agent>("SELECT * FROM agents WHERE id = $1")
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
            "UPDATE agents SET name=$1, email=$2, phone=$3, bio=$4, photo_url=$5, is_active=$6, updated_at=$7 WHERE id=$8 RETURNING *"
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
        sqlx::query("DELETE FROM agents WHERE id = $1")
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
