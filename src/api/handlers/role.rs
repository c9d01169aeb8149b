use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use crate::api::dtos::requests::{CreateRoleRequest, UpdateRoleRequest};
use crate::api::extractors::auth::TenantUser;
use crate::domain::models::role::Role;
use crate::domain::services::defaults::{is_known_permission, perms};
use crate::error::AppError;

pub async fn list_roles(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::ROLES_MANAGE)?;
    Ok(Json(auth.ctx.store.roles.list().await?))
}

pub async fn list_permissions(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::ROLES_MANAGE)?;
    Ok(Json(auth.ctx.store.roles.list_permissions().await?))
}

pub async fn create_role(
    auth: TenantUser,
    Json(payload): Json<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::ROLES_MANAGE)?;
    let name = payload.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    check_permissions(&payload.permissions)?;

    let store = &auth.ctx.store;
    if store.roles.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict(format!("Role '{}' already exists", name)));
    }

    let mut role = Role::new(name, payload.description.unwrap_or_default(), false);
    role.permissions = payload.permissions;
    let created = store.roles.create(&role).await?;

    info!(role_id = %created.id, role = %created.name, "Created role");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_role(
    auth: TenantUser,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::ROLES_MANAGE)?;
    let store = &auth.ctx.store;

    let mut role = store.roles.find_by_id(&role_id).await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;

    if let Some(permissions) = &payload.permissions {
        if role.is_system {
            return Err(AppError::Forbidden("System role permissions cannot be changed".into()));
        }
        check_permissions(permissions)?;
        store.roles.set_permissions(&role.id, permissions).await?;
    }
    if let Some(description) = payload.description {
        role.description = description;
    }

    let updated = store.roles.update(&role).await?;
    info!(role_id = %updated.id, "Updated role");
    Ok(Json(updated))
}

pub async fn delete_role(
    auth: TenantUser,
    Path(role_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::ROLES_MANAGE)?;
    let store = &auth.ctx.store;

    let role = store.roles.find_by_id(&role_id).await?
        .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
    if role.is_system {
        return Err(AppError::Forbidden("System roles cannot be deleted".into()));
    }
    if store.users.count_with_role(&role.id).await? > 0 {
        return Err(AppError::Conflict("Role is still assigned to users".into()));
    }

    store.roles.delete(&role.id).await?;
    info!(role_id = %role.id, "Deleted role");
    Ok(StatusCode::NO_CONTENT)
}

fn check_permissions(names: &[String]) -> Result<(), AppError> {
    match names.iter().find(|n| !is_known_permission(n)) {
        Some(unknown) => Err(AppError::Validation(format!("Unknown permission '{}'", unknown))),
        None => Ok(()),
    }
}
