pub mod sqlite_tenant_repo;
pub mod sqlite_super_admin_repo;
pub mod sqlite_email_job_repo;
pub mod sqlite_user_repo;
pub mod sqlite_role_repo;
pub mod sqlite_property_repo;
pub mod sqlite_lead_repo;
pub mod sqlite_agent_repo;

pub mod postgres_tenant_repo;
pub mod postgres_super_admin_repo;
pub mod postgres_email_job_repo;
pub mod postgres_user_repo;
pub mod postgres_role_repo;
pub mod postgres_property_repo;
pub mod postgres_lead_repo;
pub mod postgres_agent_repo;
