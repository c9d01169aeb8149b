use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Platform operator account, stored in the master database.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SuperAdmin {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl SuperAdmin {
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            name,
            password_hash,
            created_at: Utc::now(),
        }
    }
}
