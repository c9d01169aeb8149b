use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    SuperAdmin,
    TenantUser,
}

impl PrincipalKind {
    pub fn audience(&self) -> &'static str {
        match self {
            PrincipalKind::SuperAdmin => "platform-admin",
            PrincipalKind::TenantUser => "tenant-dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub kind: PrincipalKind,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub permissions: Vec<String>,

    pub csrf: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub csrf_token: String,
    pub expires_in: i64,
    pub principal: PrincipalProfile,
}

#[derive(Serialize, Clone)]
pub struct PrincipalProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub kind: PrincipalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub permissions: Vec<String>,
}
