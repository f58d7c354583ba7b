//! Configuration loader for the `thermal-monitoring-api` service.
//!
//! This module centralizes all runtime configuration values and their defaults.
//! Values come from environment variables (with optional `.env` file support
//! provided by the caller). The resulting [`Config`] is built once at startup and
//! handed to every collaborator explicitly; nothing else reads the environment.
use std::{env, time::Duration};

use anyhow::{anyhow, Result};
use sqlx::postgres::PgConnectOptions;

/// Parse an optional numeric variable with a default value.
macro_rules! parse_var {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string variable.
macro_rules! require_var {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Fetch an optional string variable, falling back to a default.
macro_rules! var_or {
    ($lookup:expr, $var_name:expr, $default:expr) => {
        $lookup($var_name).unwrap_or_else(|| String::from($default))
    };
}

const DEFAULT_ADMIN_EMAIL: &str = "admin@thermal-monitoring.com";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Upper bound on waiting for a pooled connection.
    pub db_acquire_timeout: Duration,

    /// Upper bound on a single store operation.
    pub db_query_timeout: Duration,

    pub api_host: String,
    pub api_port: u16,

    pub environment: String,
    pub project_name: String,
    pub version: String,

    /// Allowed CORS origins; `["*"]` allows any origin.
    pub cors_origins: Vec<String>,

    /// bcrypt work factor for stored password hashes.
    pub bcrypt_cost: u32,

    /// When set, an `admin` account is seeded with this password on startup.
    pub admin_password: Option<String>,
    pub admin_email: String,
}

/// Load configuration from the process environment.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 10)
/// - `DB_ACQUIRE_TIMEOUT_SECS` – connection acquire bound (default: 5)
/// - `DB_QUERY_TIMEOUT_SECS` – per-operation bound (default: 10)
/// - `API_HOST` / `API_PORT` – bind address (default: `0.0.0.0:8000`)
/// - `ENVIRONMENT`, `PROJECT_NAME`, `VERSION` – reported by `GET /`
/// - `CORS_ORIGINS` – comma-separated origins (default: `*`)
/// - `BCRYPT_COST` – password hashing cost (default: 12)
/// - `ADMIN_PASSWORD`, `ADMIN_EMAIL` – optional administrator seed
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    load_from(|key| env::var(key).ok())
}

/// Build a [`Config`] from an arbitrary key lookup.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let db_url = require_var!(lookup, "DATABASE_URL");
    let db_pool_max = parse_var!(lookup, "DB_POOL_MAX", u32, 10);
    let acquire_secs = parse_var!(lookup, "DB_ACQUIRE_TIMEOUT_SECS", u64, 5);
    let query_secs = parse_var!(lookup, "DB_QUERY_TIMEOUT_SECS", u64, 10);
    let api_host = var_or!(lookup, "API_HOST", "0.0.0.0");
    let api_port = parse_var!(lookup, "API_PORT", u16, 8000);
    let environment = var_or!(lookup, "ENVIRONMENT", "development");
    let project_name = var_or!(lookup, "PROJECT_NAME", "Thermal Monitoring API");
    let version = var_or!(lookup, "VERSION", env!("CARGO_PKG_VERSION"));
    let bcrypt_cost = parse_var!(lookup, "BCRYPT_COST", u32, bcrypt::DEFAULT_COST);
    let admin_password = lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty());
    let admin_email = var_or!(lookup, "ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL);

    if db_pool_max == 0 {
        return Err(anyhow!("Invalid DB_POOL_MAX: must be at least 1"));
    }
    if !(4..=31).contains(&bcrypt_cost) {
        return Err(anyhow!("Invalid BCRYPT_COST: must be between 4 and 31"));
    }

    let cors_origins = var_or!(lookup, "CORS_ORIGINS", "*")
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    Ok(Config {
        db_url,
        db_pool_max,
        db_acquire_timeout: Duration::from_secs(acquire_secs),
        db_query_timeout: Duration::from_secs(query_secs),
        api_host,
        api_port,
        environment,
        project_name,
        version,
        cors_origins,
        bcrypt_cost,
        admin_password,
        admin_email,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the database password and never prints the admin password.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL            : {}", mask_db_url(&self.db_url));
        tracing::info!("  DB_POOL_MAX             : {}", self.db_pool_max);
        tracing::info!("  DB_ACQUIRE_TIMEOUT_SECS : {}", self.db_acquire_timeout.as_secs());
        tracing::info!("  DB_QUERY_TIMEOUT_SECS   : {}", self.db_query_timeout.as_secs());
        tracing::info!("  API_HOST                : {}", self.api_host);
        tracing::info!("  API_PORT                : {}", self.api_port);
        tracing::info!("  ENVIRONMENT             : {}", self.environment);
        tracing::info!("  CORS_ORIGINS            : {}", self.cors_origins.join(","));
        tracing::info!("  BCRYPT_COST             : {}", self.bcrypt_cost);
        tracing::info!(
            "  ADMIN_PASSWORD          : {}",
            if self.admin_password.is_some() { "(set)" } else { "(unset)" }
        );
    }

    /// Connection options for the pool. Every session carries a server-side
    /// `statement_timeout` equal to `DB_QUERY_TIMEOUT_SECS`.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        // ---
        let options = self
            .db_url
            .parse::<PgConnectOptions>()
            .map_err(|e| anyhow!("Invalid DATABASE_URL '{}': {}", self.masked_db_url(), e))?;

        Ok(options.options([(
            "statement_timeout",
            self.db_query_timeout.as_millis().to_string(),
        )]))
    }

    /// Database URL with the password replaced, safe for logs and errors.
    pub fn masked_db_url(&self) -> String {
        mask_db_url(&self.db_url)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db_url", &self.masked_db_url())
            .field("db_pool_max", &self.db_pool_max)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("db_query_timeout", &self.db_query_timeout)
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("environment", &self.environment)
            .field("cors_origins", &self.cors_origins)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "****"))
            .finish_non_exhaustive()
    }
}

/// Replace the password component of a connection URL with `****`.
fn mask_db_url(url: &str) -> String {
    // ---
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let user_start = url.find("://").map_or(0, |pos| pos + 3);
    if user_start > at_pos {
        return url.to_string();
    }
    // the password runs from the first colon of the userinfo up to the last '@'
    match url[user_start..at_pos].find(':') {
        Some(offset) => format!("{}:****{}", &url[..user_start + offset], &url[at_pos..]),
        None => url.to_string(),
    }
}
