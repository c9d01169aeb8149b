use crate::domain::models::{
    tenant::{Tenant, TenantStatus}, user::User, role::{Role, Permission},
    property::{Property, PropertyFilter}, lead::Lead, agent::Agent,
    email_job::EmailJob, super_admin::SuperAdmin,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// ---- Master database ----

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, AppError>;
    async fn find_by_custom_domain(&self, domain: &str) -> Result<Option<Tenant>, AppError>;
    async fn list(&self, status: Option<TenantStatus>) -> Result<Vec<Tenant>, AppError>;
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, AppError>;
    async fn add_domain(&self, tenant_id: &str, domain: &str) -> Result<(), AppError>;
    async fn remove_domain(&self, tenant_id: &str, domain: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait SuperAdminRepository: Send + Sync {
    async fn create(&self, admin: &SuperAdmin) -> Result<SuperAdmin, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<SuperAdmin>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SuperAdmin>, AppError>;
}

#[async_trait]
pub trait EmailJobRepository: Send + Sync {
    async fn create(&self, job: &EmailJob) -> Result<EmailJob, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<EmailJob>, AppError>;
    /// Atomically moves up to `limit` due pending jobs to `processing` and returns them.
    /// Moves due pending jobs to processing. Jobs left in processing since before
    /// `stale_before` belong to a worker that never finished and are claimed again.
    async fn claim_due(&self, limit: i32, stale_before: DateTime<Utc>) -> Result<Vec<EmailJob>, AppError>;
    async fn mark_completed(&self, id: &str) -> Result<(), AppError>;
    async fn record_failure(&self, id: &str, attempts: i32, status: &str, error: &str, retry_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn requeue(&self, id: &str) -> Result<(), AppError>;
    async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<EmailJob>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

// ---- Tenant database ----

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn count_with_role(&self, role_id: &str) -> Result<i64, AppError>;
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Inserts the permission unless one with the same name exists; returns the stored row.
    async fn ensure_permission(&self, permission: &Permission) -> Result<Permission, AppError>;
    async fn list_permissions(&self) -> Result<Vec<Permission>, AppError>;
    async fn create(&self, role: &Role) -> Result<Role, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Role>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;
    async fn list(&self) -> Result<Vec<Role>, AppError>;
    async fn update(&self, role: &Role) -> Result<Role, AppError>;
    /// Replaces the role's permission set with the named permissions.
    async fn set_permissions(&self, role_id: &str, permission_names: &[String]) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, property: &Property) -> Result<Property, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;
    async fn list(&self, filter: &PropertyFilter) -> Result<(Vec<Property>, i64), AppError>;
    async fn update(&self, property: &Property) -> Result<Property, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn count_published(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: &Lead) -> Result<Lead, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Lead>, AppError>;
    async fn list(&self, status: Option<&str>) -> Result<Vec<Lead>, AppError>;
    async fn update(&self, lead: &Lead) -> Result<Lead, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn count_by_status(&self, status: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn create(&self, agent: &Agent) -> Result<Agent, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Agent>, AppError>;
    async fn list(&self, active_only: bool) -> Result<Vec<Agent>, AppError>;
    async fn update(&self, agent: &Agent) -> Result<Agent, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

/// Repositories bound to one tenant's dedicated database.
pub struct TenantStore {
    pub db_name: String,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub agents: Arc<dyn AgentRepository>,
}
