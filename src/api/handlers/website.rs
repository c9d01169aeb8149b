use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use sqlx::types::Json as JsonColumn;
use std::sync::Arc;
use tracing::info;
use crate::state::AppState;
use crate::api::dtos::requests::{normalize_domain, AddDomainRequest, UpdateWebsiteRequest};
use crate::api::extractors::auth::TenantUser;
use crate::domain::services::defaults::perms;
use crate::error::AppError;

pub async fn get_website(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::WEBSITE_MANAGE)?;
    let tenant = &auth.ctx.tenant;
    Ok(Json(json!({
        "subdomain": tenant.subdomain,
        "custom_domains": tenant.custom_domains,
        "website": tenant.website.0,
    })))
}

pub async fn update_website(
    State(state): State<Arc<AppState>>,
    auth: TenantUser,
    Json(payload): Json<UpdateWebsiteRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::WEBSITE_MANAGE)?;

    let mut tenant = auth.ctx.tenant.clone();
    tenant.website = JsonColumn(payload);
    let updated = state.tenant_repo.update(&tenant).await?;

    info!(tenant_id = %updated.id, "Website configuration updated");
    Ok(Json(updated.website.0))
}

pub async fn add_domain(
    State(state): State<Arc<AppState>>,
    auth: TenantUser,
    Json(payload): Json<AddDomainRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::WEBSITE_MANAGE)?;
    let tenant = &auth.ctx.tenant;
    let domain = normalize_domain(&payload.domain)?;

    let root = &state.config.root_domain;
    if domain == *root || domain.ends_with(&format!(".{}", root)) {
        return Err(AppError::Validation(format!("Domains under {} are assigned automatically", root)));
    }

    let limits = tenant.plan.limits();
    if !limits.allows_another_domain(tenant.custom_domains.len()) {
        return Err(AppError::Forbidden(format!(
            "The {} plan allows {} custom domain(s). Upgrade to add more.",
            limits.plan, limits.max_custom_domains
        )));
    }

    if state.tenant_repo.find_by_custom_domain(&domain).await?.is_some() {
        return Err(AppError::Conflict(format!("Domain {} is already in use", domain)));
    }

    state.tenant_repo.add_domain(&tenant.id, &domain).await?;
    info!(tenant_id = %tenant.id, domain = %domain, "Custom domain added");

    let mut custom_domains = tenant.custom_domains.clone();
    custom_domains.push(domain.clone());
    custom_domains.sort();
    Ok((StatusCode::CREATED, Json(json!({ "domain": domain, "custom_domains": custom_domains }))))
}

pub async fn remove_domain(
    State(state): State<Arc<AppState>>,
    auth: TenantUser,
    Path(domain): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::WEBSITE_MANAGE)?;
    let domain = domain.trim().trim_end_matches('.').to_lowercase();

    if !state.tenant_repo.remove_domain(&auth.ctx.tenant.id, &domain).await? {
        return Err(AppError::NotFound("Domain not found".into()));
    }

    info!(tenant_id = %auth.ctx.tenant.id, domain = %domain, "Custom domain removed");
    Ok(StatusCode::NO_CONTENT)
}
