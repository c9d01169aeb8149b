use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::plan::{ParseEnumError, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Pending => "pending",
            TenantStatus::Approved => "approved",
            TenantStatus::Rejected => "rejected",
            TenantStatus::Suspended => "suspended",
        }
    }

    pub fn can_transition_to(&self, next: TenantStatus) -> bool {
        use TenantStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Approved)
                | (Approved, Suspended)
                | (Suspended, Approved)
        )
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TenantStatus::Pending),
            "approved" => Ok(TenantStatus::Approved),
            "rejected" => Ok(TenantStatus::Rejected),
            "suspended" => Ok(TenantStatus::Suspended),
            _ => Err(ParseEnumError { kind: "tenant status", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for TenantStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeroSection {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoConfig {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub og_image: Option<String>,
}

/// Storefront content and SEO settings, stored inline on the tenant record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub hero: HeroSection,
    pub about: Option<String>,
    pub contact: ContactInfo,
    pub seo: SeoConfig,
    pub social_links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subdomain: String,
    #[serde(skip_serializing)]
    pub db_name: String,
    #[sqlx(try_from = "String")]
    pub plan: Plan,
    #[sqlx(try_from = "String")]
    pub status: TenantStatus,
    pub status_reason: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub billing_cycle_start: Option<DateTime<Utc>>,
    pub next_billing_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub website: Json<WebsiteConfig>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub custom_domains: Vec<String>,
}

impl Tenant {
    pub fn new(name: String, email: String, subdomain: String, plan: Plan) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            db_name: db_name_for(&subdomain),
            website: Json(WebsiteConfig {
                site_name: Some(name.clone()),
                contact: ContactInfo { email: Some(email.clone()), ..Default::default() },
                ..Default::default()
            }),
            name,
            email,
            phone: None,
            subdomain,
            plan,
            status: TenantStatus::Pending,
            status_reason: None,
            trial_ends_at: None,
            billing_cycle_start: None,
            next_billing_at: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
            custom_domains: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Approved
    }

    /// Public projection returned to storefronts and in duplicate-registration conflicts.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "subdomain": self.subdomain,
            "status": self.status,
            "plan": self.plan,
            "created_at": self.created_at,
        })
    }
}

/// Name of the dedicated database for a subdomain.
pub fn db_name_for(subdomain: &str) -> String {
    format!("tenant_{}", subdomain.replace('-', "_"))
}

const RESERVED_SUBDOMAINS: &[&str] = &[
    "www", "api", "app", "admin", "dashboard", "mail", "smtp", "static", "cdn", "assets", "status", "master",
];

/// Normalises and validates a requested subdomain (DNS label rules, 3..=63 chars).
pub fn normalize_subdomain(raw: &str) -> Result<String, String> {
    let subdomain = raw.trim().to_lowercase();

    if subdomain.len() < 3 || subdomain.len() > 63 {
        return Err("Subdomain must be between 3 and 63 characters".to_string());
    }
    if !subdomain.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("Subdomain may only contain letters, digits and hyphens".to_string());
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err("Subdomain cannot start or end with a hyphen".to_string());
    }
    if RESERVED_SUBDOMAINS.contains(&subdomain.as_str()) {
        return Err(format!("Subdomain '{}' is reserved", subdomain));
    }
    Ok(subdomain)
}
