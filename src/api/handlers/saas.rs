use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;
use crate::state::AppState;
use crate::api::dtos::{
    requests::{EmailJobQuery, UpgradeRequest},
    responses::{SubscriptionResponse, Usage},
};
use crate::api::extractors::auth::{SuperAdminUser, TenantUser};
use crate::domain::models::{
    email_job::{STATUS_COMPLETED, STATUS_DEAD, STATUS_PENDING, STATUS_PROCESSING},
    plan::{PlanLimits, ALL_PLANS},
};
use crate::domain::services::{defaults::perms, notifier::{plan_context, EmailKind}};
use crate::error::AppError;

const JOB_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_PROCESSING, STATUS_COMPLETED, STATUS_DEAD];

pub async fn list_plans() -> impl IntoResponse {
    let plans: Vec<PlanLimits> = ALL_PLANS.iter().map(|p| p.limits()).collect();
    Json(plans)
}

pub async fn subscription(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::BILLING_MANAGE)?;
    let tenant = &auth.ctx.tenant;
    let store = &auth.ctx.store;

    Ok(Json(SubscriptionResponse {
        plan: tenant.plan,
        status: tenant.status,
        limits: tenant.plan.limits(),
        usage: Usage {
            users: store.users.count().await?,
            listings: store.properties.count().await?,
            custom_domains: tenant.custom_domains.len(),
        },
        trial_ends_at: tenant.trial_ends_at,
        billing_cycle_start: tenant.billing_cycle_start,
        next_billing_at: tenant.next_billing_at,
    }))
}

pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    auth: TenantUser,
    Json(payload): Json<UpgradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::BILLING_MANAGE)?;
    let mut tenant = auth.ctx.tenant.clone();
    let previous = tenant.plan;

    if !previous.can_upgrade_to(payload.plan) {
        return Err(AppError::Validation(format!(
            "Cannot upgrade from {} to {}: the target plan must be higher",
            previous, payload.plan
        )));
    }

    tenant.plan = payload.plan;
    let tenant = state.tenant_repo.update(&tenant).await?;
    info!(tenant_id = %tenant.id, from = %previous, to = %tenant.plan, "Plan upgraded");

    state.notifier.notify_quietly(
        EmailKind::PlanChanged,
        Some(&tenant.id),
        &tenant.email,
        plan_context(&tenant.name, previous.as_str(), &tenant.plan.limits()),
    ).await;

    Ok(Json(tenant))
}

pub async fn list_email_jobs(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Query(query): Query<EmailJobQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(status) = &query.status {
        if !JOB_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!("status must be one of: {}", JOB_STATUSES.join(", "))));
        }
    }
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    Ok(Json(state.email_job_repo.list(query.status.as_deref(), limit).await?))
}

pub async fn retry_email_job(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.email_job_repo.find_by_id(&job_id).await?
        .ok_or_else(|| AppError::NotFound("Email job not found".into()))?;
    if job.status != STATUS_DEAD {
        return Err(AppError::Conflict(format!("Only dead jobs can be retried (status is {})", job.status)));
    }

    state.email_job_repo.requeue(&job.id).await?;
    info!(job_id = %job.id, "Dead email job requeued");

    let job = state.email_job_repo.find_by_id(&job.id).await?
        .ok_or_else(|| AppError::NotFound("Email job not found".into()))?;
    Ok(Json(job))
}
