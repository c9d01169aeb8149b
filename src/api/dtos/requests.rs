use serde::Deserialize;
use crate::domain::models::{
    lead::LEAD_STATUSES,
    plan::Plan,
    property::{LISTING_TYPES, PROPERTY_STATUSES},
    tenant::{TenantStatus, WebsiteConfig},
};
use crate::domain::services::tenant_resolver::normalize_host;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct RegisterTenantRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subdomain: String,
    pub plan: Option<Plan>,
}

impl RegisterTenantRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)
    }
}

#[derive(Deserialize)]
pub struct TenantListQuery {
    pub status: Option<TenantStatus>,
}

#[derive(Deserialize, Default)]
pub struct StatusReasonRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct SetPlanRequest {
    pub plan: Plan,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Role name; defaults to `viewer`.
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)
    }
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct LeadQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
}

impl CreateLeadRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("message", &self.message)?;
        validate_email(&self.email)
    }
}

#[derive(Deserialize)]
pub struct UpdateLeadRequest {
    pub status: Option<String>,
    /// Empty string clears the assignment.
    pub assigned_agent_id: Option<String>,
}

impl UpdateLeadRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(status) = &self.status {
            one_of("status", status, LEAD_STATUSES)?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct AgentQuery {
    pub active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
}

impl CreateAgentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("name", &self.name)?;
        validate_email(&self.email)
    }
}

#[derive(Deserialize)]
pub struct UpdateAgentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreatePropertyRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: String,
    pub listing_type: String,
    pub price: f64,
    pub currency: Option<String>,
    #[serde(default)]
    pub address: String,
    pub city: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqm: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub agent_id: Option<String>,
}

impl CreatePropertyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("city", &self.city)?;
        one_of("listing_type", &self.listing_type, LISTING_TYPES)?;
        if let Some(status) = &self.status {
            one_of("status", status, PROPERTY_STATUSES)?;
        }
        validate_price(self.price)
    }
}

#[derive(Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqm: Option<f64>,
    pub images: Option<Vec<String>>,
    pub status: Option<String>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub agent_id: Option<String>,
}

impl UpdatePropertyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(listing_type) = &self.listing_type {
            one_of("listing_type", listing_type, LISTING_TYPES)?;
        }
        if let Some(status) = &self.status {
            one_of("status", status, PROPERTY_STATUSES)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

/// Full replacement of the website document.
pub type UpdateWebsiteRequest = WebsiteConfig;

#[derive(Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
}

#[derive(Deserialize)]
pub struct UpgradeRequest {
    pub plan: Plan,
}

#[derive(Deserialize)]
pub struct EmailJobQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if !allowed.contains(&value) {
        return Err(AppError::Validation(format!("{} must be one of: {}", field, allowed.join(", "))));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    Ok(())
}

/// Lowercased hostname for a custom domain, or a validation error.
/// Accepts a bare domain or a pasted URL and returns the lowercase hostname.
pub fn normalize_domain(raw: &str) -> Result<String, AppError> {
    let domain = normalize_host(raw).unwrap_or_default();
    let labels_ok = domain.split('.').count() >= 2
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !labels_ok || domain.len() > 253 {
        return Err(AppError::Validation(format!("'{}' is not a valid domain name", raw.trim())));
    }
    Ok(domain)
}
