use std::sync::Arc;
use governor::DefaultKeyedRateLimiter;
use crate::domain::ports::{EmailJobRepository, EmailService, SuperAdminRepository, TenantRepository};
use crate::domain::services::{auth_service::AuthService, notifier::Notifier};
use crate::infra::tenant_connections::TenantConnections;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenant_repo: Arc<dyn TenantRepository>,
    pub super_admin_repo: Arc<dyn SuperAdminRepository>,
    pub email_job_repo: Arc<dyn EmailJobRepository>,
    pub tenant_connections: Arc<TenantConnections>,
    pub auth_service: Arc<AuthService>,
    pub email_service: Arc<dyn EmailService>,
    pub notifier: Arc<Notifier>,
    pub rate_limiters: Arc<RateLimiters>,
}

/// Per-client-IP token buckets.
pub struct RateLimiters {
    pub general: DefaultKeyedRateLimiter<String>,
    pub strict: DefaultKeyedRateLimiter<String>,
}

impl RateLimiters {
    /// Drops clients whose buckets have fully refilled. Returns the keys still tracked.
    pub fn prune(&self) -> usize {
        for limiter in [&self.general, &self.strict] {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
        self.general.len() + self.strict.len()
    }
}
