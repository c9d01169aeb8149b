use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Permission {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    /// Permission names, filled in by the repository from `role_permissions`.
    #[sqlx(skip)]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn new(name: String, description: String, is_system: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            is_system,
            created_at: Utc::now(),
            permissions: Vec::new(),
        }
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.iter().any(|p| p == name)
    }
}
