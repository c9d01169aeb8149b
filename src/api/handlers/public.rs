use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use crate::state::AppState;
use crate::api::dtos::{requests::CreateLeadRequest, responses::Paginated};
use crate::api::extractors::tenant::TenantContext;
use crate::api::handlers::lead::build_lead;
use crate::domain::models::property::PropertyFilter;
use crate::domain::services::notifier::EmailKind;
use crate::error::AppError;

pub async fn site(ctx: TenantContext) -> Result<impl IntoResponse, AppError> {
    let tenant = &ctx.tenant;
    Ok(Json(json!({
        "id": tenant.id,
        "name": tenant.name,
        "subdomain": tenant.subdomain,
        "custom_domains": tenant.custom_domains,
        "plan": tenant.plan,
        "website": tenant.website.0,
    })))
}

pub async fn list_properties(
    ctx: TenantContext,
    Query(mut filter): Query<PropertyFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter.published_only = true;
    let (data, total) = ctx.store.properties.list(&filter).await?;
    Ok(Json(Paginated {
        data,
        total,
        page: filter.page.unwrap_or(1).max(1),
        per_page: filter.limit(),
    }))
}

pub async fn get_property(
    ctx: TenantContext,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = ctx.store.properties.find_by_id(&property_id).await?
        .filter(|p| p.is_published)
        .ok_or_else(|| AppError::NotFound("Property not found".into()))?;
    Ok(Json(property))
}

pub async fn list_agents(ctx: TenantContext) -> Result<impl IntoResponse, AppError> {
    Ok(Json(ctx.store.agents.list(true).await?))
}

/// Storefront contact form.
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let lead = build_lead(&ctx.store, payload, "website").await?;
    let created = ctx.store.leads.create(&lead).await?;

    info!(lead_id = %created.id, "Lead submitted from website");

    let property_title = match &created.property_id {
        Some(id) => ctx.store.properties.find_by_id(id).await?.map(|p| p.title),
        None => None,
    };
    state.notifier.notify_quietly(
        EmailKind::NewLead,
        Some(&ctx.tenant.id),
        &ctx.tenant.email,
        json!({
            "lead_name": created.name,
            "lead_email": created.email,
            "lead_phone": created.phone,
            "message": created.message,
            "property_title": property_title,
            "dashboard_url": state.config.dashboard_url,
        }),
    ).await;

    Ok((StatusCode::CREATED, Json(json!({ "id": created.id, "status": created.status }))))
}
