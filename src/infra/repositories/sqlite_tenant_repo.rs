use crate::domain::{models::tenant::{Tenant, TenantStatus}, ports::TenantRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;

pub struct SqliteTenantRepo {
    pool: SqlitePool,
}

impl SqliteTenantRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn with_domains(&self, tenant: Option<Tenant>) -> Result<Option<Tenant>, AppError> {
        let Some(mut tenant) = tenant else { return Ok(None) };
        tenant.custom_domains = sqlx::query_scalar::<_, String>(
            "SELECT domain FROM tenant_domains WHERE tenant_id = ? ORDER BY domain ASC",
        )
            .bind(&tenant.id)
            .fetch_all(&self.pool)
            .await?;
        Ok(Some(tenant))
    }
}

#[async_trait]
impl TenantRepository for SqliteTenantRepo {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, email, phone, subdomain, db_name, plan, status, status_reason, trial_ends_at, billing_cycle_start, next_billing_at, approved_at, website, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&tenant.id)
            .bind(&tenant.name)
            .bind(&tenant.email)
            .bind(&tenant.phone)
            .bind(&tenant.subdomain)
            .bind(&tenant.db_name)
            .bind(tenant.plan.as_str())
            .bind(tenant.status.as_str())
            .bind(&tenant.status_reason)
            .bind(tenant.trial_ends_at)
            .bind(tenant.billing_cycle_start)
            .bind(tenant.next_billing_at)
            .bind(tenant.approved_at)
            .bind(&tenant.website)
            .bind(tenant.created_at)
            .bind(tenant.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_domains(tenant).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        self.with_domains(tenant).await
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE subdomain = ?")
            .bind(subdomain)
            .fetch_optional(&self.pool)
            .await?;
        self.with_domains(tenant).await
    }

    async fn find_by_custom_domain(&self, domain: &str) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT t.* FROM tenants t JOIN tenant_domains d ON d.tenant_id = t.id WHERE d.domain = ?",
        )
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        self.with_domains(tenant).await
    }

    async fn list(&self, status: Option<TenantStatus>) -> Result<Vec<Tenant>, AppError> {
        let mut tenants = match status {
            Some(status) => sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE status = ? ORDER BY created_at DESC")
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?,
            None => sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        };

        let rows = sqlx::query_as::<_, (String, String)>("SELECT tenant_id, domain FROM tenant_domains ORDER BY domain ASC")
            .fetch_all(&self.pool)
            .await?;
        let mut by_tenant: HashMap<String, Vec<String>> = HashMap::new();
        for (tenant_id, domain) in rows {
            by_tenant.entry(tenant_id).or_default().push(domain);
        }
        for tenant in tenants.iter_mut() {
            tenant.custom_domains = by_tenant.remove(&tenant.id).unwrap_or_default();
        }
        Ok(tenants)
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError> {
        let updated = sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET name=?, phone=?, plan=?, status=?, status_reason=?, trial_ends_at=?, billing_cycle_start=?, next_billing_at=?, approved_at=?, website=?, updated_at=? \
             WHERE id=? RETURNING *"
        )
            .bind(&tenant.name)
            .bind(&tenant.phone)
            .bind(tenant.plan.as_str())
            .bind(tenant.status.as_str())
            .bind(&tenant.status_reason)
            .bind(tenant.trial_ends_at)
            .bind(tenant.billing_cycle_start)
            .bind(tenant.next_billing_at)
            .bind(tenant.approved_at)
            .bind(&tenant.website)
            .bind(Utc::now())
            .bind(&tenant.id)
            .fetch_optional(&self.pool)
            .await?;
        self.with_domains(updated).await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
    }

    async fn add_domain(&self, tenant_id: &str, domain: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO tenant_domains (domain, tenant_id, created_at) VALUES (?, ?, ?)")
            .bind(domain)
            .bind(tenant_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove_domain(&self, tenant_id: &str, domain: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenant_domains WHERE tenant_id = ? AND domain = ?")
            .bind(tenant_id)
            .bind(domain)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
