use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub master_database_url: String,
    pub tenant_database_url_template: String, // must contain `{db}`
    pub port: u16,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub token_ttl_minutes: i64,
    pub root_domain: String,
    pub dashboard_url: String,
    pub platform_admin_email: Option<String>,
    pub super_admin_email: Option<String>,
    pub super_admin_password: Option<String>,
    pub email_queue_enabled: bool,
    pub email_max_attempts: i32,
    pub email_worker_interval_secs: u64,
    /// Seconds a claimed job may stay in processing before another worker takes it over.
    pub email_processing_lease_secs: i64,
    pub mail_from: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_service_url: Option<String>,
    pub mail_service_token: Option<String>,
    pub trial_days: i64,
    pub rate_limit_per_minute: u32,
    pub auth_rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let master_database_url = env::var("MASTER_DATABASE_URL").expect("MASTER_DATABASE_URL must be set");
        let tenant_database_url_template = env::var("TENANT_DATABASE_URL_TEMPLATE")
            .unwrap_or_else(|_| default_tenant_template(&master_database_url));

        Self {
            master_database_url,
            tenant_database_url_template,
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.agency-saas.local".to_string()),
            token_ttl_minutes: parse_or("TOKEN_TTL_MINUTES", 60),
            root_domain: env::var("ROOT_DOMAIN").unwrap_or_else(|_| "localhost".to_string()).to_lowercase(),
            dashboard_url: env::var("DASHBOARD_URL").unwrap_or_else(|_| "http://localhost:3001".to_string()),
            platform_admin_email: env::var("PLATFORM_ADMIN_EMAIL").ok(),
            super_admin_email: env::var("SUPER_ADMIN_EMAIL").ok(),
            super_admin_password: env::var("SUPER_ADMIN_PASSWORD").ok(),
            email_queue_enabled: env::var("EMAIL_QUEUE_ENABLED").map(|v| v == "true" || v == "1").unwrap_or(true),
            email_max_attempts: parse_or("EMAIL_MAX_ATTEMPTS", 5),
            email_worker_interval_secs: parse_or("EMAIL_WORKER_INTERVAL_SECS", 5),
            email_processing_lease_secs: parse_or("EMAIL_PROCESSING_LEASE_SECS", 300),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@agency-saas.local".to_string()),
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: parse_or("SMTP_PORT", 587),
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            mail_service_url: env::var("MAIL_SERVICE_URL").ok().filter(|u| !u.is_empty()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").ok(),
            trial_days: parse_or("TRIAL_DAYS", 14),
            rate_limit_per_minute: parse_or("RATE_LIMIT_PER_MINUTE", 300),
            auth_rate_limit_per_minute: parse_or("AUTH_RATE_LIMIT_PER_MINUTE", 10),
        }
    }

    pub fn is_postgres(&self) -> bool {
        is_postgres_url(&self.master_database_url)
    }
}

/// Fills the `{db}` placeholder of a tenant URL template.
pub fn tenant_database_url(template: &str, db_name: &str) -> String {
    template.replace("{db}", db_name)
}

pub fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Postgres: swap the database path segment, keeping connection parameters.
/// SQLite: sibling files next to the master DB.
pub fn default_tenant_template(master_url: &str) -> String {
    if is_postgres_url(master_url) {
        let (base, query) = match master_url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (master_url, None),
        };
        let prefix = match base.rfind('/') {
            Some(idx) if idx > base.find("://").map_or(0, |i| i + 2) => &base[..idx],
            _ => base,
        };
        match query {
            Some(query) => format!("{}/{{db}}?{}", prefix, query),
            None => format!("{}/{{db}}", prefix),
        }
    } else {
        "sqlite://./data/{db}.db".to_string()
    }
}
