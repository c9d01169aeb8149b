use crate::domain::{models::tenant::Tenant, ports::TenantRepository};
use crate::error::AppError;
use tracing::debug;

/// What a request tells us about its tenant, in the form it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantHint {
    /// Explicit subdomain sent by a server-side caller.
    Subdomain(String),
    /// Bare hostname from `Origin` or `Host`.
    Host(String),
}

impl TenantHint {
    /// Picks the first usable value: explicit header, then `Origin`, then `Host`.
    pub fn from_headers(explicit: Option<&str>, origin: Option<&str>, host: Option<&str>) -> Option<Self> {
        if let Some(sub) = explicit.map(|s| s.trim().trim_end_matches('.').to_lowercase()).filter(|s| !s.is_empty()) {
            return Some(TenantHint::Subdomain(sub));
        }
        origin
            .and_then(normalize_host)
            .or_else(|| host.and_then(normalize_host))
            .map(TenantHint::Host)
    }
}

/// Reduces an `Origin` or `Host` value to a lowercase hostname: no scheme, path,
/// port or trailing dot. Returns `None` for empty or `null` origins.
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }

    let without_scheme = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
    let authority = without_scheme.split(['/', '?', '#']).next().unwrap_or_default();
    let authority = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);

    let host = if let Some(rest) = authority.strip_prefix('[') {
        rest.split(']').next().unwrap_or_default()
    } else {
        authority.split(':').next().unwrap_or_default()
    };

    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// First DNS label of a multi-label host, e.g. `acme` for `acme.agencyhub.io`.
pub fn leftmost_label(host: &str) -> Option<&str> {
    let (label, rest) = host.split_once('.')?;
    if label.is_empty() || rest.is_empty() {
        return None;
    }
    Some(label)
}

/// Finds the approved tenant a request belongs to.
pub async fn resolve_tenant(repo: &dyn TenantRepository, hint: &TenantHint) -> Result<Tenant, AppError> {
    let tenant = match hint {
        TenantHint::Subdomain(sub) => repo.find_by_subdomain(sub).await?,
        TenantHint::Host(host) => find_by_host(repo, host).await?,
    };

    match tenant {
        Some(t) if t.is_active() => Ok(t),
        Some(t) => {
            debug!(tenant_id = %t.id, status = %t.status, "Tenant matched but is not approved");
            Err(AppError::NotFound("Tenant not found".into()))
        }
        None => Err(AppError::NotFound("Tenant not found".into())),
    }
}

async fn find_by_host(repo: &dyn TenantRepository, host: &str) -> Result<Option<Tenant>, AppError> {
    if let Some(t) = repo.find_by_custom_domain(host).await? {
        return Ok(Some(t));
    }
    if let Some(bare) = host.strip_prefix("www.") {
        if let Some(t) = repo.find_by_custom_domain(bare).await? {
            return Ok(Some(t));
        }
    }
    match leftmost_label(host) {
        Some(sub) => repo.find_by_subdomain(sub).await,
        None => Ok(None),
    }
}
