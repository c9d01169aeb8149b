use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::Span;
use crate::state::AppState;
use crate::domain::models::tenant::Tenant;
use crate::domain::ports::TenantStore;
use crate::domain::services::tenant_resolver::{resolve_tenant, TenantHint};
use crate::error::AppError;

pub const TENANT_HEADER: &str = "x-tenant-subdomain";

/// The approved tenant a request belongs to, plus its database handle.
#[derive(Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub store: Arc<TenantStore>,
}

impl FromRequestParts<Arc<AppState>> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(ctx.clone());
        }

        let hint = {
            let header_str = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
            let host = header_str(header::HOST.as_str()).or_else(|| parts.uri.host());
            TenantHint::from_headers(header_str(TENANT_HEADER), header_str(header::ORIGIN.as_str()), host)
        }
        .ok_or_else(|| AppError::NotFound("Tenant not found".into()))?;

        let tenant = resolve_tenant(state.tenant_repo.as_ref(), &hint).await?;
        let store = state.tenant_connections.get(&tenant.db_name).await?;

        Span::current().record("tenant_id", tenant.id.as_str());

        let ctx = TenantContext { tenant, store };
        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}
