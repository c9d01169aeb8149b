use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::domain::models::{
    role::{Permission, Role},
    tenant::{Tenant, TenantStatus},
    user::User,
};
use crate::domain::ports::TenantStore;
use crate::domain::services::auth_service::{hash_password, random_token};
use crate::domain::services::defaults::{ADMIN_ROLE, DEFAULT_ROLES, PERMISSIONS};
use crate::error::AppError;

pub const ADMIN_PASSWORD_LENGTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ProvisionedAdmin {
    pub user_id: String,
    pub email: String,
    /// Set only when the account was created by this call.
    pub password: Option<String>,
}

/// Seeds the permission catalogue and the system roles. Safe to run repeatedly.
pub async fn seed_defaults(store: &TenantStore) -> Result<Role, AppError> {
    for (name, description) in PERMISSIONS {
        store.roles.ensure_permission(&Permission::new(name, description)).await?;
    }

    let mut admin_role = None;
    for default in DEFAULT_ROLES {
        let role = match store.roles.find_by_name(default.name).await? {
            Some(existing) => existing,
            None => {
                let mut role = Role::new(default.name.to_string(), default.description.to_string(), true);
                role.permissions = default.permissions.iter().map(|p| p.to_string()).collect();
                store.roles.create(&role).await?
            }
        };
        if role.name == ADMIN_ROLE {
            admin_role = Some(role);
        }
    }

    admin_role.ok_or_else(|| AppError::InternalWithMsg("Admin role missing after seeding".into()))
}

/// Brings a tenant database to a usable state: default roles plus an admin account
/// for the tenant's registration email. An existing admin account is left untouched.
pub async fn provision_tenant(store: &TenantStore, tenant: &Tenant) -> Result<ProvisionedAdmin, AppError> {
    let admin_role = seed_defaults(store).await?;

    if let Some(existing) = store.users.find_by_email(&tenant.email.to_lowercase()).await? {
        info!(tenant_id = %tenant.id, "Admin user already present, keeping credentials");
        return Ok(ProvisionedAdmin { user_id: existing.id, email: existing.email, password: None });
    }

    let password = random_token(ADMIN_PASSWORD_LENGTH);
    let user = User::new(
        tenant.email.clone(),
        format!("{} Admin", tenant.name),
        hash_password(&password)?,
        admin_role.id.clone(),
    );
    let user = store.users.create(&user).await?;
    info!(tenant_id = %tenant.id, user_id = %user.id, "Tenant admin user created");

    Ok(ProvisionedAdmin { user_id: user.id, email: user.email, password: Some(password) })
}

/// Applies the approval state change and starts the trial.
pub fn mark_approved(tenant: &mut Tenant, trial_days: i64, now: DateTime<Utc>) {
    let trial_ends_at = now + Duration::days(trial_days);
    tenant.status = TenantStatus::Approved;
    tenant.status_reason = None;
    tenant.approved_at = Some(now);
    tenant.billing_cycle_start = Some(now);
    tenant.trial_ends_at = Some(trial_ends_at);
    tenant.next_billing_at = Some(trial_ends_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::plan::Plan;

    #[test]
    fn approval_starts_trial_and_billing() {
        let mut tenant = Tenant::new("Acme".into(), "owner@acme.io".into(), "acme".into(), Plan::Pro);
        tenant.status = TenantStatus::Rejected;
        tenant.status_reason = Some("incomplete".into());
        let now = Utc::now();

        mark_approved(&mut tenant, 14, now);

        assert_eq!(tenant.status, TenantStatus::Approved);
        assert_eq!(tenant.status_reason, None);
        assert_eq!(tenant.approved_at, Some(now));
        assert_eq!(tenant.trial_ends_at, Some(now + Duration::days(14)));
        assert_eq!(tenant.next_billing_at, tenant.trial_ends_at);
    }
}
