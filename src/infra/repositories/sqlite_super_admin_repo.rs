use crate::domain::{models::super_admin::SuperAdmin, ports::SuperAdminRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSuperAdminRepo {
    pool: SqlitePool,
}

impl SqliteSuperAdminRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SuperAdminRepository for SqliteSuperAdminRepo {
    async fn create(&self, admin: &SuperAdmin) -> Result<SuperAdmin, AppError> {
        sqlx::query_as::<_, SuperAdmin>(
            "INSERT INTO super_admins (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&admin.id)
            .bind(&admin.email)
            .bind(&admin.name)
            .bind(&admin.password_hash)
            .bind(admin.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<SuperAdmin>, AppError> {
        sqlx::query_as::<_, SuperAdmin>("SELECT * FROM super_admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SuperAdmin>, AppError> {
        sqlx::query_as::<_, SuperAdmin>("SELECT * FROM super_admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
