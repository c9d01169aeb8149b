use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use crate::state::AppState;
use crate::api::dtos::{
    requests::{RegisterTenantRequest, SetPlanRequest, StatusReasonRequest, TenantListQuery},
    responses::{AdminCredentials, ApprovalResponse, SubdomainAvailability},
};
use crate::api::extractors::auth::SuperAdminUser;
use crate::domain::models::{
    plan::Plan,
    tenant::{normalize_subdomain, Tenant, TenantStatus},
};
use crate::domain::services::{
    notifier::{plan_context, EmailKind},
    provisioning::{mark_approved, provision_tenant},
};
use crate::error::AppError;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let subdomain = normalize_subdomain(&payload.subdomain).map_err(AppError::Validation)?;
    let email = payload.email.trim().to_lowercase();

    if let Some(existing) = state.tenant_repo.find_by_email(&email).await? {
        return Err(duplicate_email(&existing));
    }
    if state.tenant_repo.find_by_subdomain(&subdomain).await?.is_some() {
        return Err(subdomain_taken());
    }

    let mut tenant = Tenant::new(
        payload.name.trim().to_string(),
        email,
        subdomain,
        payload.plan.unwrap_or(Plan::Free),
    );
    tenant.phone = payload.phone;
    let created = match state.tenant_repo.create(&tenant).await {
        Ok(created) => created,
        // Lost a race with a concurrent registration, report what won
        Err(e) if e.is_unique_violation() => {
            return Err(match state.tenant_repo.find_by_email(&tenant.email).await? {
                Some(existing) => duplicate_email(&existing),
                None => subdomain_taken(),
            });
        }
        Err(e) => return Err(e),
    };

    info!(tenant_id = %created.id, subdomain = %created.subdomain, "Tenant registered, awaiting approval");

    let context = json!({
        "tenant_id": created.id,
        "tenant_name": created.name,
        "tenant_email": created.email,
        "subdomain": created.subdomain,
        "root_domain": state.config.root_domain,
        "plan": created.plan,
    });
    state.notifier
        .notify_quietly(EmailKind::RegistrationReceived, Some(&created.id), &created.email, context.clone())
        .await;
    if let Some(admin_email) = &state.config.platform_admin_email {
        state.notifier
            .notify_quietly(EmailKind::NewRegistrationAdmin, Some(&created.id), admin_email, context)
            .await;
    }

    Ok((StatusCode::CREATED, Json(created)))
}

fn duplicate_email(existing: &Tenant) -> AppError {
    AppError::Duplicate {
        message: "A tenant with this email is already registered".into(),
        existing: existing.summary(),
    }
}

fn subdomain_taken() -> AppError {
    AppError::Conflict("Subdomain is already taken".into())
}

pub async fn check_subdomain(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let response = match normalize_subdomain(&raw) {
        Err(reason) => SubdomainAvailability {
            subdomain: raw.trim().to_lowercase(),
            available: false,
            reason: Some(reason),
        },
        Ok(subdomain) => {
            let taken = state.tenant_repo.find_by_subdomain(&subdomain).await?.is_some();
            SubdomainAvailability {
                subdomain,
                available: !taken,
                reason: taken.then(|| "Subdomain is already taken".to_string()),
            }
        }
    };
    Ok(Json(response))
}

pub async fn list_tenants(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Query(query): Query<TenantListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let tenants = state.tenant_repo.list(query.status).await?;
    Ok(Json(tenants))
}

pub async fn get_tenant(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load(&state, &id).await?))
}

pub async fn approve_tenant(
    State(state): State<Arc<AppState>>,
    admin: SuperAdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut tenant = load(&state, &id).await?;
    ensure_transition(&tenant, TenantStatus::Approved)?;

    // Opening the store creates the database and runs the tenant migrations.
    let store = state.tenant_connections.get(&tenant.db_name).await?;
    let admin_account = provision_tenant(&store, &tenant).await?;

    mark_approved(&mut tenant, state.config.trial_days, Utc::now());
    let tenant = state.tenant_repo.update(&tenant).await?;

    info!(tenant_id = %tenant.id, approved_by = %admin.claims.sub, "Tenant approved and provisioned");

    let login_url = format!("{}/login", state.config.dashboard_url.trim_end_matches('/'));
    state.notifier.notify_quietly(
        EmailKind::TenantApproved,
        Some(&tenant.id),
        &tenant.email,
        json!({
            "tenant_name": tenant.name,
            "site_url": format!("https://{}.{}", tenant.subdomain, state.config.root_domain),
            "login_url": login_url,
            "admin_email": admin_account.email,
            "admin_password": admin_account.password,
            "trial_ends_at": tenant.trial_ends_at.map(|d| d.format("%Y-%m-%d").to_string()),
        }),
    ).await;

    let admin_credentials = admin_account.password.map(|password| AdminCredentials {
        email: admin_account.email,
        password,
        login_url,
    });

    Ok(Json(ApprovalResponse { tenant, admin_credentials }))
}

pub async fn reject_tenant(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(id): Path<String>,
    payload: Option<Json<StatusReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let reason = payload.and_then(|Json(p)| p.reason);
    let tenant = change_status(&state, &id, TenantStatus::Rejected, reason).await?;

    state.notifier.notify_quietly(
        EmailKind::TenantRejected,
        Some(&tenant.id),
        &tenant.email,
        json!({ "tenant_name": tenant.name, "reason": tenant.status_reason }),
    ).await;

    Ok(Json(tenant))
}

pub async fn suspend_tenant(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(id): Path<String>,
    payload: Option<Json<StatusReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let reason = payload.and_then(|Json(p)| p.reason);
    let tenant = change_status(&state, &id, TenantStatus::Suspended, reason).await?;

    state.notifier.notify_quietly(
        EmailKind::TenantSuspended,
        Some(&tenant.id),
        &tenant.email,
        json!({ "tenant_name": tenant.name, "reason": tenant.status_reason }),
    ).await;

    Ok(Json(tenant))
}

pub async fn reactivate_tenant(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let current = load(&state, &id).await?;
    if current.status != TenantStatus::Suspended {
        return Err(AppError::Conflict(format!("Only suspended tenants can be reactivated (status is {})", current.status)));
    }
    let tenant = change_status(&state, &id, TenantStatus::Approved, None).await?;
    Ok(Json(tenant))
}

pub async fn set_plan(
    State(state): State<Arc<AppState>>,
    _admin: SuperAdminUser,
    Path(id): Path<String>,
    Json(payload): Json<SetPlanRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut tenant = load(&state, &id).await?;
    let previous = tenant.plan;
    if previous == payload.plan {
        return Ok(Json(tenant));
    }

    tenant.plan = payload.plan;
    let tenant = state.tenant_repo.update(&tenant).await?;
    info!(tenant_id = %tenant.id, from = %previous, to = %tenant.plan, "Plan set by platform admin");

    state.notifier.notify_quietly(
        EmailKind::PlanChanged,
        Some(&tenant.id),
        &tenant.email,
        plan_context(&tenant.name, previous.as_str(), &tenant.plan.limits()),
    ).await;

    Ok(Json(tenant))
}

async fn load(state: &AppState, id: &str) -> Result<Tenant, AppError> {
    state.tenant_repo.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))
}

fn ensure_transition(tenant: &Tenant, next: TenantStatus) -> Result<(), AppError> {
    if !tenant.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!("Cannot change tenant status from {} to {}", tenant.status, next)));
    }
    Ok(())
}

async fn change_status(state: &AppState, id: &str, next: TenantStatus, reason: Option<String>) -> Result<Tenant, AppError> {
    let mut tenant = load(state, id).await?;
    ensure_transition(&tenant, next)?;

    let previous = tenant.status;
    tenant.status = next;
    tenant.status_reason = reason.filter(|r| !r.trim().is_empty());
    let tenant = state.tenant_repo.update(&tenant).await?;

    info!(tenant_id = %tenant.id, from = %previous, to = %next, "Tenant status changed");
    Ok(tenant)
}
