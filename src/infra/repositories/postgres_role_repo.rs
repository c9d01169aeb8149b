use crate::domain::{models::role::{Permission, Role}, ports::RoleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct PostgresRoleRepo {
    pool: PgPool,
}

impl PostgresRoleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_permissions(&self, role: Option<Role>) -> Result<Option<Role>, AppError> {
        let Some(mut role) = role else { return Ok(None) };
        role.permissions = sqlx::query_scalar::<_, String>(
            "SELECT p.name FROM permissions p JOIN role_permissions rp ON rp.permission_id = p.id WHERE rp.role_id = $1 ORDER BY p.name ASC",
        )
            .bind(&role.id)
            .fetch_all(&self.pool)
            .await?;
        Ok(Some(role))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepo {
    async fn ensure_permission(&self, permission: &Permission) -> Result<Permission, AppError> {
        sqlx::query("INSERT INTO permissions (id, name, description) VALUES ($1, $2, $3) ON CONFLICT (name) DO NOTHING")
            .bind(&permission.id)
            .bind(&permission.name)
            .bind(&permission.description)
            .execute(&self.pool)
            .await?;

        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE name = $1")
            .bind(&permission.name)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create(&self, role: &Role) -> Result<Role, AppError> {
        sqlx::query("INSERT INTO roles (id, name, description, is_system, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(role.is_system)
            .bind(role.created_at)
            .execute(&self.pool)
            .await?;

        self.set_permissions(&role.id, &role.permissions).await?;
        self.find_by_id(&role.id).await?
            .ok_or(AppError::Internal)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_permissions(role).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        self.with_permissions(role).await
    }

    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let mut roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT rp.role_id, p.name FROM role_permissions rp JOIN permissions p ON p.id = rp.permission_id ORDER BY p.name ASC",
        )
            .fetch_all(&self.pool)
            .await?;
        let mut by_role: HashMap<String, Vec<String>> = HashMap::new();
        for (role_id, name) in rows {
            by_role.entry(role_id).or_default().push(name);
        }
        for role in roles.iter_mut() {
            role.permissions = by_role.remove(&role.id).unwrap_or_default();
        }
        Ok(roles)
    }

    async fn update(&self, role: &Role) -> Result<Role, AppError> {
        let updated = sqlx::query_as::<_, Role>("UPDATE roles SET name=$1, description=$2 WHERE id=$3 RETURNING *")
            .bind(&role.name)
            .bind(&role.description)
            .bind(&role.id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_permissions(updated).await?
            .ok_or_else(|| AppError::NotFound("Role not found".into()))
    }

    async fn set_permissions(&self, role_id: &str, permission_names: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        for name in permission_names {
            sqlx::query("INSERT INTO role_permissions (role_id, permission_id) SELECT $1, id FROM permissions WHERE name = $2 ON CONFLICT DO NOTHING")
                .bind(role_id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}
