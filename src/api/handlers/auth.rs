use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use chrono::Utc;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};
use crate::state::AppState;
use crate::api::dtos::requests::{ChangePasswordRequest, LoginRequest};
use crate::api::extractors::{auth::{AnyPrincipal, TenantUser, ACCESS_TOKEN_COOKIE}, tenant::TenantContext};
use crate::domain::models::auth::{AuthResponse, PrincipalKind, PrincipalProfile};
use crate::domain::services::auth_service::{hash_password, validate_password_strength, verify_password, IssuedToken};
use crate::error::AppError;

pub async fn login(
    State(state): State<Arc<AppState>>,
    ctx: TenantContext,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    let user = ctx.store.users.find_by_email(&email).await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(tenant_id = %ctx.tenant.id, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    let role = ctx.store.roles.find_by_id(&user.role_id).await?
        .ok_or_else(|| AppError::InternalWithMsg(format!("Role {} of user {} missing", user.role_id, user.id)))?;

    let issued = state.auth_service.issue_for_user(&ctx.tenant, &user, &role)?;
    ctx.store.users.record_login(&user.id, Utc::now()).await?;
    set_access_cookie(&cookies, &issued, state.auth_service.ttl_minutes());

    info!(tenant_id = %ctx.tenant.id, user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token: issued.token,
        csrf_token: issued.csrf_token,
        expires_in: issued.expires_in,
        principal: PrincipalProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            kind: PrincipalKind::TenantUser,
            tenant_id: Some(ctx.tenant.id),
            role: Some(role.name),
            permissions: role.permissions,
        },
    }))
}

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    let admin = state.super_admin_repo.find_by_email(&email).await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&payload.password, &admin.password_hash)? {
        warn!("Failed platform admin login attempt");
        return Err(AppError::Unauthorized);
    }

    let issued = state.auth_service.issue_for_super_admin(&admin)?;
    set_access_cookie(&cookies, &issued, state.auth_service.ttl_minutes());

    info!(admin_id = %admin.id, "Platform admin logged in");

    Ok(Json(AuthResponse {
        token: issued.token,
        csrf_token: issued.csrf_token,
        expires_in: issued.expires_in,
        principal: PrincipalProfile {
            id: admin.id,
            email: admin.email,
            name: admin.name,
            kind: PrincipalKind::SuperAdmin,
            tenant_id: None,
            role: None,
            permissions: Vec::new(),
        },
    }))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AnyPrincipal(claims): AnyPrincipal,
) -> Result<impl IntoResponse, AppError> {
    let profile = match claims.kind {
        PrincipalKind::SuperAdmin => {
            let admin = state.super_admin_repo.find_by_id(&claims.sub).await?
                .ok_or(AppError::Unauthorized)?;
            PrincipalProfile {
                id: admin.id,
                email: admin.email,
                name: admin.name,
                kind: PrincipalKind::SuperAdmin,
                tenant_id: None,
                role: None,
                permissions: Vec::new(),
            }
        }
        PrincipalKind::TenantUser => {
            let tenant_id = claims.tenant_id.clone().ok_or(AppError::Unauthorized)?;
            let tenant = state.tenant_repo.find_by_id(&tenant_id).await?
                .filter(|t| t.is_active())
                .ok_or(AppError::Unauthorized)?;
            let store = state.tenant_connections.get(&tenant.db_name).await?;
            let user = store.users.find_by_id(&claims.sub).await?
                .ok_or(AppError::Unauthorized)?;
            if !user.is_active {
                return Err(AppError::Forbidden("Account is deactivated".into()));
            }
            PrincipalProfile {
                id: user.id,
                email: user.email,
                name: user.name,
                kind: PrincipalKind::TenantUser,
                tenant_id: Some(tenant.id),
                role: claims.role,
                permissions: claims.permissions,
            }
        }
    };

    Ok(Json(profile))
}

pub async fn logout(cookies: Cookies) -> Result<impl IntoResponse, AppError> {
    cookies.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").into());
    info!("Principal logged out");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    auth: TenantUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_password_strength(&payload.new_password)?;

    let mut user = auth.user;
    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(AppError::Validation("Current password is incorrect".into()));
    }

    user.password_hash = hash_password(&payload.new_password)?;
    auth.ctx.store.users.update(&user).await?;

    info!(user_id = %user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

fn set_access_cookie(cookies: &Cookies, issued: &IssuedToken, ttl_minutes: i64) {
    let mut access_c = Cookie::new(ACCESS_TOKEN_COOKIE, issued.token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ttl_minutes));
    cookies.add(access_c);
}
