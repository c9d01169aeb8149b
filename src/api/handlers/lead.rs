use axum::{extract::{Path, Query}, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use crate::api::dtos::requests::{CreateLeadRequest, LeadQuery, UpdateLeadRequest};
use crate::api::extractors::auth::TenantUser;
use crate::domain::models::lead::{Lead, LEAD_STATUSES};
use crate::domain::ports::TenantStore;
use crate::domain::services::defaults::perms;
use crate::error::AppError;

pub async fn list_leads(
    auth: TenantUser,
    Query(query): Query<LeadQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::LEADS_READ)?;
    if let Some(status) = &query.status {
        if !LEAD_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!("status must be one of: {}", LEAD_STATUSES.join(", "))));
        }
    }
    Ok(Json(auth.ctx.store.leads.list(query.status.as_deref()).await?))
}

pub async fn get_lead(
    auth: TenantUser,
    Path(lead_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::LEADS_READ)?;
    Ok(Json(load(&auth.ctx.store, &lead_id).await?))
}

pub async fn create_lead(
    auth: TenantUser,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::LEADS_WRITE)?;
    payload.validate()?;
    let store = &auth.ctx.store;

    let lead = build_lead(store, payload, "manual").await?;
    let created = store.leads.create(&lead).await?;

    info!(lead_id = %created.id, "Created manual lead");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_lead(
    auth: TenantUser,
    Path(lead_id): Path<String>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::LEADS_WRITE)?;
    payload.validate()?;
    let store = &auth.ctx.store;

    let mut lead = load(store, &lead_id).await?;
    if let Some(status) = payload.status {
        lead.status = status;
    }
    if let Some(agent_id) = payload.assigned_agent_id {
        if agent_id.is_empty() {
            lead.assigned_agent_id = None;
        } else {
            store.agents.find_by_id(&agent_id).await?
                .ok_or_else(|| AppError::Validation("Assigned agent does not exist".into()))?;
            lead.assigned_agent_id = Some(agent_id);
        }
    }

    let updated = store.leads.update(&lead).await?;
    info!(lead_id = %updated.id, status = %updated.status, "Updated lead");
    Ok(Json(updated))
}

pub async fn delete_lead(
    auth: TenantUser,
    Path(lead_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::LEADS_WRITE)?;
    let store = &auth.ctx.store;
    load(store, &lead_id).await?;
    store.leads.delete(&lead_id).await?;
    info!(lead_id = %lead_id, "Deleted lead");
    Ok(StatusCode::NO_CONTENT)
}

/// Shared with the public contact form. Rejects references to unknown listings.
pub async fn build_lead(store: &TenantStore, payload: CreateLeadRequest, source: &str) -> Result<Lead, AppError> {
    if let Some(property_id) = &payload.property_id {
        store.properties.find_by_id(property_id).await?
            .ok_or_else(|| AppError::Validation("Referenced property does not exist".into()))?;
    }

    let mut lead = Lead::new(
        payload.name.trim().to_string(),
        payload.email.trim().to_lowercase(),
        payload.message.trim().to_string(),
        source,
    );
    lead.phone = payload.phone;
    lead.property_id = payload.property_id;
    Ok(lead)
}

async fn load(store: &TenantStore, id: &str) -> Result<Lead, AppError> {
    store.leads.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Lead not found".into()))
}
