use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, Method},
};
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;
use crate::state::AppState;
use crate::api::extractors::tenant::TenantContext;
use crate::domain::models::auth::{Claims, PrincipalKind};
use crate::domain::models::user::User;
use crate::error::AppError;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Authenticated dashboard user of the tenant the request resolved to.
/// The account is re-read on every request, so deactivation and deletion
/// take effect before the token expires.
pub struct TenantUser {
    pub claims: Claims,
    pub user: User,
    pub ctx: TenantContext,
}

impl TenantUser {
    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.claims.permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Missing permission: {}", permission)))
        }
    }

    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }
}

impl FromRequestParts<Arc<AppState>> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, PrincipalKind::TenantUser)?;
        let ctx = TenantContext::from_request_parts(parts, state).await?;

        if claims.tenant_id.as_deref() != Some(ctx.tenant.id.as_str()) {
            return Err(AppError::Forbidden("Token was issued for another tenant".into()));
        }

        let user = ctx.store.users.find_by_id(&claims.sub).await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".into()));
        }

        Span::current().record("user_id", claims.sub.as_str());
        Ok(TenantUser { claims, user, ctx })
    }
}

pub struct SuperAdminUser {
    pub claims: Claims,
}

impl FromRequestParts<Arc<AppState>> for SuperAdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, PrincipalKind::SuperAdmin)?;
        Span::current().record("user_id", claims.sub.as_str());
        Ok(SuperAdminUser { claims })
    }
}

/// Either principal kind, without tying the request to a tenant host.
pub struct AnyPrincipal(pub Claims);

impl FromRequestParts<Arc<AppState>> for AnyPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let claims = authenticate(parts, state, PrincipalKind::SuperAdmin)
            .or_else(|_| authenticate(parts, state, PrincipalKind::TenantUser))?;

        if let Some(tenant_id) = &claims.tenant_id {
            Span::current().record("tenant_id", tenant_id.as_str());
        }
        Span::current().record("user_id", claims.sub.as_str());
        Ok(AnyPrincipal(claims))
    }
}

fn authenticate(parts: &Parts, state: &AppState, kind: PrincipalKind) -> Result<Claims, AppError> {
    let (token, from_cookie) = extract_token(parts).ok_or(AppError::Unauthorized)?;
    let claims = state.auth_service.verify(&token, kind)?;

    if from_cookie && !is_safe_method(&parts.method) {
        let csrf = parts.headers.get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?;
        if csrf != claims.csrf {
            return Err(AppError::Forbidden("Invalid CSRF token".into()));
        }
    }

    Ok(claims)
}

/// Bearer header first, then the login cookie. The flag is true for the cookie.
fn extract_token(parts: &Parts) -> Option<(String, bool)> {
    let bearer = parts.headers.get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some((token, false));
    }

    let cookies = parts.extensions.get::<Cookies>()?;
    cookies.get(ACCESS_TOKEN_COOKIE).map(|c| (c.value().to_string(), true))
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
