use axum::{extract::{Path, Query}, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use crate::api::dtos::requests::{validate_email, AgentQuery, CreateAgentRequest, UpdateAgentRequest};
use crate::api::extractors::auth::TenantUser;
use crate::domain::models::agent::Agent;
use crate::domain::ports::TenantStore;
use crate::domain::services::defaults::perms;
use crate::error::AppError;

pub async fn list_agents(
    auth: TenantUser,
    Query(query): Query<AgentQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::AGENTS_READ)?;
    Ok(Json(auth.ctx.store.agents.list(query.active.unwrap_or(false)).await?))
}

pub async fn get_agent(
    auth: TenantUser,
    Path(agent_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::AGENTS_READ)?;
    Ok(Json(load(&auth.ctx.store, &agent_id).await?))
}

pub async fn create_agent(
    auth: TenantUser,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::AGENTS_WRITE)?;
    payload.validate()?;

    let mut agent = Agent::new(payload.name.trim().to_string(), payload.email.trim().to_lowercase());
    agent.phone = payload.phone;
    agent.bio = payload.bio;
    agent.photo_url = payload.photo_url;

    let created = auth.ctx.store.agents.create(&agent).await?;
    info!(agent_id = %created.id, "Created agent");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_agent(
    auth: TenantUser,
    Path(agent_id): Path<String>,
    Json(payload): Json<UpdateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::AGENTS_WRITE)?;
    let store = &auth.ctx.store;
    let mut agent = load(store, &agent_id).await?;

    if let Some(name) = payload.name.filter(|n| !n.trim().is_empty()) {
        agent.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        validate_email(&email)?;
        agent.email = email.trim().to_lowercase();
    }
    if payload.phone.is_some() {
        agent.phone = payload.phone;
    }
    if payload.bio.is_some() {
        agent.bio = payload.bio;
    }
    if payload.photo_url.is_some() {
        agent.photo_url = payload.photo_url;
    }
    if let Some(is_active) = payload.is_active {
        agent.is_active = is_active;
    }

    let updated = store.agents.update(&agent).await?;
    info!(agent_id = %updated.id, "Updated agent");
    Ok(Json(updated))
}

pub async fn delete_agent(
    auth: TenantUser,
    Path(agent_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::AGENTS_WRITE)?;
    let store = &auth.ctx.store;
    load(store, &agent_id).await?;
    store.agents.delete(&agent_id).await?;
    info!(agent_id = %agent_id, "Deleted agent");
    Ok(StatusCode::NO_CONTENT)
}

async fn load(store: &TenantStore, id: &str) -> Result<Agent, AppError> {
    store.agents.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Agent not found".into()))
}
