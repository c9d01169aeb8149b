use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use tracing::info;
use crate::api::dtos::requests::{CreateUserRequest, UpdateUserRequest};
use crate::api::extractors::auth::TenantUser;
use crate::domain::models::{role::Role, user::User};
use crate::domain::ports::TenantStore;
use crate::domain::services::auth_service::{hash_password, validate_password_strength};
use crate::domain::services::defaults::perms;
use crate::error::AppError;

const DEFAULT_MEMBER_ROLE: &str = "viewer";

pub async fn list_members(auth: TenantUser) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::USERS_MANAGE)?;
    let users = auth.ctx.store.users.list().await?;
    Ok(Json(users))
}

pub async fn create_member(
    auth: TenantUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::USERS_MANAGE)?;
    payload.validate()?;
    validate_password_strength(&payload.password)?;
    let store = &auth.ctx.store;

    let limits = auth.ctx.tenant.plan.limits();
    if !limits.allows_another_user(store.users.count().await?) {
        return Err(AppError::Forbidden(format!(
            "The {} plan allows at most {} users. Upgrade to add more.",
            limits.plan,
            limits.max_users.unwrap_or_default()
        )));
    }

    let email = payload.email.trim().to_lowercase();
    if store.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("A user with this email already exists".into()));
    }

    let role = find_role(store, payload.role.as_deref().unwrap_or(DEFAULT_MEMBER_ROLE)).await?;
    let user = User::new(email, payload.name.trim().to_string(), hash_password(&payload.password)?, role.id);
    let created = store.users.create(&user).await?;

    info!(user_id = %created.id, role = %role.name, "Created dashboard user");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_member(
    auth: TenantUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::USERS_MANAGE)?;
    let store = &auth.ctx.store;

    let mut user = store.users.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if user.id == auth.user_id() && (payload.is_active == Some(false) || payload.role.is_some()) {
        return Err(AppError::Validation("You cannot change your own role or deactivate yourself".into()));
    }

    if let Some(name) = payload.name.filter(|n| !n.trim().is_empty()) {
        user.name = name.trim().to_string();
    }
    if let Some(role_name) = payload.role {
        user.role_id = find_role(store, &role_name).await?.id;
    }
    if let Some(is_active) = payload.is_active {
        user.is_active = is_active;
    }

    let updated = store.users.update(&user).await?;
    info!(user_id = %updated.id, "Updated dashboard user");
    Ok(Json(updated))
}

pub async fn delete_member(
    auth: TenantUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::USERS_MANAGE)?;

    if user_id == auth.user_id() {
        return Err(AppError::Validation("You cannot delete your own account".into()));
    }

    let store = &auth.ctx.store;
    store.users.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    store.users.delete(&user_id).await?;

    info!(user_id = %user_id, "Deleted dashboard user");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_role(store: &TenantStore, name: &str) -> Result<Role, AppError> {
    store.roles.find_by_name(name).await?
        .ok_or_else(|| AppError::Validation(format!("Unknown role '{}'", name)))
}
