use crate::config::Config;
use crate::domain::models::{
    auth::{Claims, PrincipalKind},
    role::Role,
    super_admin::SuperAdmin,
    tenant::Tenant,
    user::User,
};
use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

pub struct IssuedToken {
    pub token: String,
    pub csrf_token: String,
    pub expires_in: i64,
}

/// Issues and verifies access tokens for both principal kinds.
pub struct AuthService {
    issuer: String,
    ttl_minutes: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            issuer: config.auth_issuer.clone(),
            ttl_minutes: config.token_ttl_minutes,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    pub fn issue_for_user(&self, tenant: &Tenant, user: &User, role: &Role) -> Result<IssuedToken, AppError> {
        self.issue(
            PrincipalKind::TenantUser,
            &user.id,
            &user.email,
            Some(tenant.id.clone()),
            Some(role.name.clone()),
            role.permissions.clone(),
        )
    }

    pub fn issue_for_super_admin(&self, admin: &SuperAdmin) -> Result<IssuedToken, AppError> {
        self.issue(PrincipalKind::SuperAdmin, &admin.id, &admin.email, None, None, Vec::new())
    }

    fn issue(
        &self,
        kind: PrincipalKind,
        subject: &str,
        email: &str,
        tenant_id: Option<String>,
        role: Option<String>,
        permissions: Vec<String>,
    ) -> Result<IssuedToken, AppError> {
        let csrf_token = random_token(32);
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.ttl_minutes)).timestamp() as usize;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            aud: kind.audience().to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            kind,
            email: email.to_string(),
            tenant_id,
            role,
            permissions,
            csrf: csrf_token.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        Ok(IssuedToken {
            token,
            csrf_token,
            expires_in: self.ttl_minutes * 60,
        })
    }

    /// Validates signature, expiry, issuer and audience, and that the token belongs to `kind`.
    pub fn verify(&self, token: &str, kind: PrincipalKind) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[kind.audience()]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized)?;

        if data.claims.kind != kind {
            return Err(AppError::Unauthorized);
        }
        Ok(data.claims)
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}

/// `Ok(false)` on mismatch, `Err` only when the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalWithMsg(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::InternalWithMsg(format!("Password verification failed: {}", e))),
    }
}

pub fn random_token(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation("Password must be at least 8 characters".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::plan::Plan;

    fn config() -> Config {
        Config {
            master_database_url: "sqlite://unused.db".into(),
            tenant_database_url_template: "sqlite://./unused/{db}.db".into(),
            port: 0,
            jwt_secret: "unit-test-secret".into(),
            auth_issuer: "unit-test".into(),
            token_ttl_minutes: 5,
            root_domain: "localhost".into(),
            dashboard_url: "http://localhost".into(),
            platform_admin_email: None,
            super_admin_email: None,
            super_admin_password: None,
            email_queue_enabled: false,
            email_max_attempts: 3,
            email_worker_interval_secs: 1,
        email_processing_lease_secs: 300,
            mail_from: "no-reply@test.local".into(),
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            mail_service_url: None,
            mail_service_token: None,
            trial_days: 14,
            rate_limit_per_minute: 100,
            auth_rate_limit_per_minute: 100,
        }
    }

    #[test]
    fn tenant_token_round_trip_carries_permissions() {
        let auth = AuthService::new(&config());
        let tenant = Tenant::new("Acme".into(), "owner@acme.io".into(), "acme".into(), Plan::Free);
        let user = User::new("owner@acme.io".into(), "Owner".into(), "hash".into(), "role-1".into());
        let mut role = Role::new("admin".into(), "".into(), true);
        role.permissions = vec!["properties:read".into()];

        let issued = auth.issue_for_user(&tenant, &user, &role).unwrap();
        let claims = auth.verify(&issued.token, PrincipalKind::TenantUser).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.tenant_id.as_deref(), Some(tenant.id.as_str()));
        assert_eq!(claims.permissions, vec!["properties:read".to_string()]);
        assert_eq!(claims.csrf, issued.csrf_token);
    }

    #[test]
    fn principal_kinds_are_not_interchangeable() {
        let auth = AuthService::new(&config());
        let admin = SuperAdmin::new("root@platform.io".into(), "Root".into(), "hash".into());
        let issued = auth.issue_for_super_admin(&admin).unwrap();

        assert!(auth.verify(&issued.token, PrincipalKind::SuperAdmin).is_ok());
        assert!(matches!(auth.verify(&issued.token, PrincipalKind::TenantUser), Err(AppError::Unauthorized)));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let auth = AuthService::new(&config());
        let mut other_config = config();
        other_config.jwt_secret = "another-secret".into();
        let other = AuthService::new(&other_config);

        let admin = SuperAdmin::new("root@platform.io".into(), "Root".into(), "hash".into());
        let issued = other.issue_for_super_admin(&admin).unwrap();
        assert!(auth.verify(&issued.token, PrincipalKind::SuperAdmin).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
