use axum::{response::IntoResponse, Json};
use crate::api::dtos::responses::{DashboardStats, LeadCounts, Usage};
use crate::api::extractors::auth::TenantUser;
use crate::domain::services::defaults::perms;
use crate::error::AppError;

pub async fn stats(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::DASHBOARD_VIEW)?;
    let store = &auth.ctx.store;
    let tenant = &auth.ctx.tenant;

    let properties = store.properties.count().await?;
    let leads = LeadCounts {
        total: store.leads.count().await?,
        new: store.leads.count_by_status("new").await?,
        contacted: store.leads.count_by_status("contacted").await?,
        qualified: store.leads.count_by_status("qualified").await?,
        closed: store.leads.count_by_status("closed").await?,
    };

    Ok(Json(DashboardStats {
        properties,
        published_properties: store.properties.count_published().await?,
        agents: store.agents.count().await?,
        leads,
        plan: tenant.plan.limits(),
        usage: Usage {
            users: store.users.count().await?,
            listings: properties,
            custom_domains: tenant.custom_domains.len(),
        },
    }))
}
