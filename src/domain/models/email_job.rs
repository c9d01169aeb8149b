use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_DEAD: &str = "dead";

/// A rendered email waiting for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub kind: String,
    pub tenant_id: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EmailJob {
    pub id: String,
    pub tenant_id: Option<String>,
    pub kind: String,
    pub recipient: String,
    pub subject: String,
    #[serde(skip_serializing)]
    pub html_body: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub execute_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailJob {
    pub fn new(email: OutboundEmail, max_attempts: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: email.tenant_id,
            kind: email.kind,
            recipient: email.recipient,
            subject: email.subject,
            html_body: email.html_body,
            status: STATUS_PENDING.to_string(),
            attempts: 0,
            max_attempts,
            last_error: None,
            execute_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Delay before the next delivery attempt: 30s doubled per failed attempt, capped at 1h.
pub fn retry_backoff(attempts: i32) -> Duration {
    let exp = attempts.clamp(0, 7) as u32;
    Duration::seconds((30_i64 * 2_i64.pow(exp)).min(3600))
}
