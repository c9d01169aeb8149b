use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

pub const LISTING_TYPES: &[&str] = &["sale", "rent"];
pub const PROPERTY_STATUSES: &[&str] = &["available", "under_offer", "sold", "rented"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub listing_type: String,
    pub price: f64,
    pub currency: String,
    pub address: String,
    pub city: String,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqm: Option<f64>,
    pub images: Json<Vec<String>>,
    pub status: String,
    pub is_published: bool,
    pub is_featured: bool,
    pub agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(title: String, property_type: String, listing_type: String, price: f64, city: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            property_type,
            listing_type,
            price,
            currency: "USD".to_string(),
            address: String::new(),
            city,
            bedrooms: None,
            bathrooms: None,
            area_sqm: None,
            images: Json(Vec::new()),
            status: "available".to_string(),
            is_published: false,
            is_featured: false,
            agent_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing filters shared by the dashboard and the public catalogue.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub featured: Option<bool>,
    #[serde(skip)]
    pub published_only: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PropertyFilter {
    pub fn limit(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        // Saturates so absurd page numbers land past the end instead of overflowing
        (self.page.unwrap_or(1).max(1) - 1).saturating_mul(self.limit())
    }
}
