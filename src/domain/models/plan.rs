use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Billing plan. Variant order is the upgrade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanLimits {
    pub plan: Plan,
    /// `None` means unlimited.
    pub max_users: Option<u32>,
    pub max_listings: Option<u32>,
    pub max_custom_domains: u32,
    pub monthly_price: u32,
}

pub const ALL_PLANS: [Plan; 3] = [Plan::Free, Plan::Pro, Plan::Enterprise];

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits {
                plan: *self,
                max_users: Some(2),
                max_listings: Some(10),
                max_custom_domains: 0,
                monthly_price: 0,
            },
            Plan::Pro => PlanLimits {
                plan: *self,
                max_users: Some(10),
                max_listings: Some(250),
                max_custom_domains: 1,
                monthly_price: 49,
            },
            Plan::Enterprise => PlanLimits {
                plan: *self,
                max_users: None,
                max_listings: None,
                max_custom_domains: 5,
                monthly_price: 199,
            },
        }
    }

    pub fn can_upgrade_to(&self, target: Plan) -> bool {
        target > *self
    }
}

impl PlanLimits {
    pub fn allows_another_user(&self, current: i64) -> bool {
        self.max_users.map_or(true, |max| current < max as i64)
    }

    pub fn allows_another_listing(&self, current: i64) -> bool {
        self.max_listings.map_or(true, |max| current < max as i64)
    }

    pub fn allows_another_domain(&self, current: usize) -> bool {
        current < self.max_custom_domains as usize
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            _ => Err(ParseEnumError { kind: "plan", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Plan {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
