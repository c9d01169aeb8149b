use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use governor::{Quota, RateLimiter};
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::ConnectOptions;
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::{AppState, RateLimiters};
use crate::domain::models::super_admin::SuperAdmin;
use crate::domain::ports::{EmailJobRepository, EmailService, SuperAdminRepository, TenantRepository};
use crate::domain::services::{auth_service::{hash_password, AuthService}, notifier::{email_templates, Notifier}};
use crate::error::AppError;
use crate::infra::email::{
    fallback_email_service::FallbackEmailService, http_email_service::HttpEmailService,
    smtp_email_service::SmtpEmailService,
};
use crate::infra::repositories::{
    postgres_email_job_repo::PostgresEmailJobRepo, postgres_super_admin_repo::PostgresSuperAdminRepo,
    postgres_tenant_repo::PostgresTenantRepo,
    sqlite_email_job_repo::SqliteEmailJobRepo, sqlite_super_admin_repo::SqliteSuperAdminRepo,
    sqlite_tenant_repo::SqliteTenantRepo,
};
use crate::infra::tenant_connections::TenantConnections;

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let email_service = Arc::new(build_email_service(config)?);
    bootstrap_state_with_email(config, email_service).await
}

/// Builds the state around an already constructed mail sender.
pub async fn bootstrap_state_with_email(config: &Config, email_service: Arc<dyn EmailService>) -> Result<AppState, AppError> {
    let master_url = &config.master_database_url;

    let (tenant_repo, super_admin_repo, email_job_repo, tenant_connections): (
        Arc<dyn TenantRepository>,
        Arc<dyn SuperAdminRepository>,
        Arc<dyn EmailJobRepository>,
        Arc<TenantConnections>,
    ) = if config.is_postgres() {
        info!("Initializing PostgreSQL master connection...");

        let opts = PgConnectOptions::from_str(master_url)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid Postgres URL: {}", e)))?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("./migrations/master/postgres").run(&pool).await?;

        (
            Arc::new(PostgresTenantRepo::new(pool.clone())),
            Arc::new(PostgresSuperAdminRepo::new(pool.clone())),
            Arc::new(PostgresEmailJobRepo::new(pool.clone())),
            Arc::new(TenantConnections::new(config.tenant_database_url_template.clone(), Some(pool))),
        )
    } else {
        info!("Initializing SQLite master connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(master_url)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        sqlx::migrate!("./migrations/master/sqlite").run(&pool).await?;

        (
            Arc::new(SqliteTenantRepo::new(pool.clone())),
            Arc::new(SqliteSuperAdminRepo::new(pool.clone())),
            Arc::new(SqliteEmailJobRepo::new(pool)),
            Arc::new(TenantConnections::new(config.tenant_database_url_template.clone(), None)),
        )
    };

    seed_super_admin(config, super_admin_repo.as_ref()).await?;

    let notifier = Arc::new(Notifier::new(
        config.email_queue_enabled,
        config.email_max_attempts,
        email_job_repo.clone(),
        email_service.clone(),
        Arc::new(email_templates()?),
    ));

    Ok(AppState {
        config: config.clone(),
        tenant_repo,
        super_admin_repo,
        email_job_repo,
        tenant_connections,
        auth_service: Arc::new(AuthService::new(config)),
        email_service,
        notifier,
        rate_limiters: Arc::new(build_rate_limiters(config)),
    })
}

/// SMTP first, then the HTTP mail API. Either may be absent.
pub fn build_email_service(config: &Config) -> Result<FallbackEmailService, AppError> {
    let mut providers: Vec<(&'static str, Arc<dyn EmailService>)> = Vec::new();

    if let Some(host) = &config.smtp_host {
        let smtp = SmtpEmailService::new(
            host,
            config.smtp_port,
            config.smtp_username.clone(),
            config.smtp_password.clone(),
            config.mail_from.clone(),
        )?;
        providers.push(("smtp", Arc::new(smtp)));
    }

    if let Some(url) = &config.mail_service_url {
        providers.push((
            "http",
            Arc::new(HttpEmailService::new(
                url.clone(),
                config.mail_service_token.clone().unwrap_or_default(),
                config.mail_from.clone(),
            )),
        ));
    }

    let service = FallbackEmailService::new(providers);
    if service.provider_names().is_empty() {
        warn!("No email provider configured, outgoing mail will be skipped");
    } else {
        info!(providers = ?service.provider_names(), "Email delivery chain configured");
    }
    Ok(service)
}

pub fn build_rate_limiters(config: &Config) -> RateLimiters {
    let per_minute = |n: u32| Quota::per_minute(NonZeroU32::new(n.max(1)).unwrap_or(NonZeroU32::MIN));
    RateLimiters {
        general: RateLimiter::keyed(per_minute(config.rate_limit_per_minute)),
        strict: RateLimiter::keyed(per_minute(config.auth_rate_limit_per_minute)),
    }
}

async fn seed_super_admin(config: &Config, repo: &dyn SuperAdminRepository) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.super_admin_email, &config.super_admin_password) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();

    if repo.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let admin = SuperAdmin::new(email, "Platform Admin".to_string(), hash_password(password)?);
    repo.create(&admin).await?;
    info!(email = %admin.email, "Seeded platform super admin");
    Ok(())
}
