use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const LEAD_STATUSES: &[&str] = &["new", "contacted", "qualified", "closed"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub property_id: Option<String>,
    pub source: String,
    pub status: String,
    pub assigned_agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(name: String, email: String, message: String, source: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            phone: None,
            message,
            property_id: None,
            source: source.to_string(),
            status: "new".to_string(),
            assigned_agent_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
