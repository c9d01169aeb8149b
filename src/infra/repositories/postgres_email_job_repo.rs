use crate::domain::{models::email_job::EmailJob, ports::EmailJobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresEmailJobRepo {
    pool: PgPool,
}

impl PostgresEmailJobRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl EmailJobRepository for PostgresEmailJobRepo {
    async fn create(&self, job: &EmailJob) -> Result<EmailJob, AppError> {
        sqlx::query_as::<_, EmailJob>(
            "INSERT INTO email_jobs (id, tenant_id, kind, recipient, subject, html_body, status, attempts, max_attempts, last_error, execute_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *"
        )
            .bind(&job.id)
            .bind(&job.tenant_id)
            .bind(&job.kind)
            .bind(&job.recipient)
            .bind(&job.subject)
            .bind(&job.html_body)
            .bind(&job.status)
            .bind(job.attempts)
            .bind(job.max_attempts)
            .bind(&job.last_error)
            .bind(job.execute_at)
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<EmailJob>, AppError> {
        sqlx::query_as::<_, EmailJob>("SELECT * FROM email_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn claim_due(&self, limit: i32, stale_before: DateTime<Utc>) -> Result<Vec<EmailJob>, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, EmailJob>(
            r#"
            UPDATE email_jobs
            SET status = 'processing', updated_at = $1
            WHERE id IN (
                SELECT id
                FROM email_jobs
                WHERE (status = 'pending' AND execute_at <= $2)
                   OR (status = 'processing' AND updated_at < $3)
                ORDER BY execute_at ASC
                LIMIT $4
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#
        )
            .bind(now)
            .bind(now)
            .bind(stale_before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_completed(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE email_jobs SET status = 'completed', last_error = NULL, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn record_failure(&self, id: &str, attempts: i32, status: &str, error: &str, retry_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE email_jobs SET status = $1, attempts = $2, last_error = $3, execute_at = $4, updated_at = $5 WHERE id = $6")
            .bind(status)
            .bind(attempts)
            .bind(error)
            .bind(retry_at)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn requeue(&self, id: &str) -> Result<(), AppError> {
        let now = Utc::now();
        sqlx::query("UPDATE email_jobs SET status = 'pending', attempts = 0, execute_at = $1, updated_at = $2 WHERE id = $3")
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<EmailJob>, AppError> {
        match status {
            Some(status) => sqlx::query_as::<_, EmailJob>("SELECT * FROM email_jobs WHERE status = $1 ORDER BY created_at DESC LIMIT $2")
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await,
            None => sqlx::query_as::<_, EmailJob>("SELECT * FROM email_jobs ORDER BY created_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await,
        }
            .map_err(AppError::Database)
    }
}
