use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{
    plan::{Plan, PlanLimits},
    tenant::{Tenant, TenantStatus},
};

#[derive(Serialize)]
pub struct SubdomainAvailability {
    pub subdomain: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
    pub login_url: String,
}

#[derive(Serialize)]
pub struct ApprovalResponse {
    pub tenant: Tenant,
    /// Absent when the admin account already existed.
    pub admin_credentials: Option<AdminCredentials>,
}

#[derive(Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Serialize)]
pub struct Usage {
    pub users: i64,
    pub listings: i64,
    pub custom_domains: usize,
}

#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub plan: Plan,
    pub status: TenantStatus,
    pub limits: PlanLimits,
    pub usage: Usage,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub billing_cycle_start: Option<DateTime<Utc>>,
    pub next_billing_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct LeadCounts {
    pub total: i64,
    pub new: i64,
    pub contacted: i64,
    pub qualified: i64,
    pub closed: i64,
}

#[derive(Serialize)]
pub struct DashboardStats {
    pub properties: i64,
    pub published_properties: i64,
    pub agents: i64,
    pub leads: LeadCounts,
    pub plan: PlanLimits,
    pub usage: Usage,
}
