use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::log::LevelFilter;
use tracing::{info, warn};

use crate::config::{is_postgres_url, tenant_database_url};
use crate::domain::ports::TenantStore;
use crate::error::AppError;
use crate::infra::repositories::{
    postgres_agent_repo::PostgresAgentRepo, postgres_lead_repo::PostgresLeadRepo,
    postgres_property_repo::PostgresPropertyRepo, postgres_role_repo::PostgresRoleRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_agent_repo::SqliteAgentRepo, sqlite_lead_repo::SqliteLeadRepo,
    sqlite_property_repo::SqlitePropertyRepo, sqlite_role_repo::SqliteRoleRepo,
    sqlite_user_repo::SqliteUserRepo,
};

fn sqlite_store(db_name: &str, pool: sqlx::SqlitePool) -> TenantStore {
    TenantStore {
        db_name: db_name.to_string(),
        users: Arc::new(SqliteUserRepo::new(pool.clone())),
        roles: Arc::new(SqliteRoleRepo::new(pool.clone())),
        properties: Arc::new(SqlitePropertyRepo::new(pool.clone())),
        leads: Arc::new(SqliteLeadRepo::new(pool.clone())),
        agents: Arc::new(SqliteAgentRepo::new(pool)),
    }
}

fn postgres_store(db_name: &str, pool: PgPool) -> TenantStore {
    TenantStore {
        db_name: db_name.to_string(),
        users: Arc::new(PostgresUserRepo::new(pool.clone())),
        roles: Arc::new(PostgresRoleRepo::new(pool.clone())),
        properties: Arc::new(PostgresPropertyRepo::new(pool.clone())),
        leads: Arc::new(PostgresLeadRepo::new(pool.clone())),
        agents: Arc::new(PostgresAgentRepo::new(pool)),
    }
}

/// Process-wide cache of tenant database handles, keyed by database name.
///
/// The first caller for a name opens the pool and runs the tenant migrations; every
/// concurrent or later caller receives the same `Arc<TenantStore>`. Entries are never
/// evicted and never health-checked. A failed open leaves the slot empty so the next
/// request tries again.
pub struct TenantConnections {
    url_template: String,
    admin_pool: Option<PgPool>,
    stores: Mutex<HashMap<String, Arc<OnceCell<Arc<TenantStore>>>>>,
    opened: AtomicUsize,
}

impl TenantConnections {
    /// `admin_pool` is the master Postgres pool, used to `CREATE DATABASE` on first use.
    pub fn new(url_template: String, admin_pool: Option<PgPool>) -> Self {
        Self {
            url_template,
            admin_pool,
            stores: Mutex::new(HashMap::new()),
            opened: AtomicUsize::new(0),
        }
    }

    pub async fn get(&self, db_name: &str) -> Result<Arc<TenantStore>, AppError> {
        let cell = {
            let mut stores = self.stores.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            stores.entry(db_name.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_try_init(|| self.open(db_name)).await.cloned()
    }

    /// Number of pools opened since start. Stays equal to the number of distinct names.
    pub fn connections_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn cached_names(&self) -> Vec<String> {
        let stores = self.stores.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        stores.iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(name, _)| name.clone())
            .collect()
    }

    async fn open(&self, db_name: &str) -> Result<Arc<TenantStore>, AppError> {
        if db_name.is_empty() || !db_name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
            return Err(AppError::Validation(format!("Invalid tenant database name: {}", db_name)));
        }

        let url = tenant_database_url(&self.url_template, db_name);
        let store = if is_postgres_url(&url) {
            self.open_postgres(db_name, &url).await?
        } else {
            self.open_sqlite(db_name, &url).await?
        };

        self.opened.fetch_add(1, Ordering::SeqCst);
        info!(db_name = %db_name, "Tenant database connection established");
        Ok(Arc::new(store))
    }

    async fn open_postgres(&self, db_name: &str, url: &str) -> Result<TenantStore, AppError> {
        if let Some(admin) = &self.admin_pool {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
                .bind(db_name)
                .fetch_one(admin)
                .await?;
            if !exists {
                info!(db_name = %db_name, "Creating tenant database");
                // db_name is validated above, identifiers cannot be bound as parameters
                sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name))
                    .execute(admin)
                    .await?;
            }
        }

        let opts = PgConnectOptions::from_str(url)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid tenant Postgres URL: {}", e)))?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| {
                warn!(db_name = %db_name, "Tenant database connect failed: {:?}", e);
                AppError::Unavailable(format!("Tenant database {} unreachable", db_name))
            })?;

        sqlx::migrate!("./migrations/tenant/postgres").run(&pool).await?;
        Ok(postgres_store(db_name, pool))
    }

    async fn open_sqlite(&self, db_name: &str, url: &str) -> Result<TenantStore, AppError> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid tenant SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        if let Some(parent) = opts.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await
                    .map_err(|e| AppError::InternalWithMsg(format!("Cannot create tenant data directory: {}", e)))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| {
                warn!(db_name = %db_name, "Tenant database connect failed: {:?}", e);
                AppError::Unavailable(format!("Tenant database {} unreachable", db_name))
            })?;

        sqlx::migrate!("./migrations/tenant/sqlite").run(&pool).await?;
        Ok(sqlite_store(db_name, pool))
    }
}
