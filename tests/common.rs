#![allow(dead_code)]

use agency_saas::{
    api::router::create_router,
    config::Config,
    domain::ports::EmailService,
    error::AppError,
    infra::factory::bootstrap_state_with_email,
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const SUPER_ADMIN_EMAIL: &str = "root@platform.test";
pub const SUPER_ADMIN_PASSWORD: &str = "SuperSecret123";
pub const PLATFORM_ADMIN_EMAIL: &str = "ops@platform.test";
pub const ROOT_DOMAIN: &str = "agencyhub.test";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every message; can be switched to fail.
#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail: AtomicBool,
}

impl RecordingEmailService {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<SentEmail> {
        self.sent().into_iter().filter(|e| e.recipient == recipient).collect()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalWithMsg("mock provider down".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

pub struct TestTenant {
    pub id: String,
    pub subdomain: String,
    pub admin_email: String,
    pub admin_password: String,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingEmailService>,
    pub dir: PathBuf,
}

pub fn test_config(dir: &PathBuf) -> Config {
    Config {
        master_database_url: format!("sqlite://{}/master.db", dir.display()),
        tenant_database_url_template: format!("sqlite://{}/{{db}}.db", dir.display()),
        port: 0,
        jwt_secret: "integration-test-secret".to_string(),
        auth_issuer: "test-issuer".to_string(),
        token_ttl_minutes: 30,
        root_domain: ROOT_DOMAIN.to_string(),
        dashboard_url: "https://dashboard.agencyhub.test".to_string(),
        platform_admin_email: Some(PLATFORM_ADMIN_EMAIL.to_string()),
        super_admin_email: Some(SUPER_ADMIN_EMAIL.to_string()),
        super_admin_password: Some(SUPER_ADMIN_PASSWORD.to_string()),
        email_queue_enabled: false,
        email_max_attempts: 3,
        email_worker_interval_secs: 1,
        email_processing_lease_secs: 300,
        mail_from: "no-reply@agencyhub.test".to_string(),
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        mail_service_url: None,
        mail_service_token: None,
        trial_days: 14,
        rate_limit_per_minute: 10_000,
        auth_rate_limit_per_minute: 10_000,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = std::env::temp_dir().join(format!("agency_saas_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("Failed to create test dir");

        let mut config = test_config(&dir);
        customize(&mut config);

        let mailer = Arc::new(RecordingEmailService::default());
        let state = Arc::new(
            bootstrap_state_with_email(&config, mailer.clone())
                .await
                .expect("Failed to bootstrap test state"),
        );
        let router = create_router(state.clone());

        Self { router, state, mailer, dir }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// JSON request with optional bearer token and extra headers.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Request addressed to a tenant through the explicit subdomain header.
    pub async fn tenant_call(
        &self,
        subdomain: &str,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.call(method, uri, token, &[("x-tenant-subdomain", subdomain)], body).await
    }

    pub async fn super_admin_token(&self) -> String {
        let (status, body) = self.call(
            "POST",
            "/api/auth/admin/login",
            None,
            &[],
            Some(json!({ "email": SUPER_ADMIN_EMAIL, "password": SUPER_ADMIN_PASSWORD })),
        ).await;
        assert_eq!(status, StatusCode::OK, "super admin login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn register(&self, name: &str, email: &str, subdomain: &str) -> (StatusCode, Value) {
        self.call(
            "POST",
            "/api/tenants/register",
            None,
            &[],
            Some(json!({ "name": name, "email": email, "subdomain": subdomain })),
        ).await
    }

    pub async fn approve(&self, tenant_id: &str) -> (StatusCode, Value) {
        let token = self.super_admin_token().await;
        self.call("POST", &format!("/api/tenants/{}/approve", tenant_id), Some(&token), &[], None).await
    }

    pub async fn login(&self, subdomain: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.tenant_call(
            subdomain,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ).await
    }

    /// Registers, approves and logs in as the generated admin.
    pub async fn create_tenant(&self, subdomain: &str) -> TestTenant {
        let email = format!("owner@{}.example.com", subdomain);
        let (status, body) = self.register(&format!("{} Realty", subdomain), &email, subdomain).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) = self.approve(&id).await;
        assert_eq!(status, StatusCode::OK, "approve failed: {}", body);
        let admin_password = body["admin_credentials"]["password"].as_str().unwrap().to_string();

        let (status, body) = self.login(subdomain, &email, &admin_password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        TestTenant {
            id,
            subdomain: subdomain.to_string(),
            admin_email: email,
            admin_password,
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn set_plan(&self, tenant_id: &str, plan: &str) {
        let token = self.super_admin_token().await;
        let (status, body) = self.call(
            "PUT",
            &format!("/api/tenants/{}/plan", tenant_id),
            Some(&token),
            &[],
            Some(json!({ "plan": plan })),
        ).await;
        assert_eq!(status, StatusCode::OK, "set plan failed: {}", body);
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
}
