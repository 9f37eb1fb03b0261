//! Users service configuration

use common::{database::DatabaseConfig, settings::{self, Env}};
use config::{ConfigError, Environment};
use serde::Deserialize;

/// Settings of the users service, read once at startup
///
/// # Environment Variables
/// - `ENV`: `local`, `dev` or `prod` (default: `local`)
/// - `GRPC_PORT`: port the gRPC server listens on (default: 50051)
/// - `DATABASE_URL`: PostgreSQL connection URL (required)
/// - `DATABASE_MAX_CONNECTIONS`: maximum pool size (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: minimum pool size (default: 1)
/// - `DATABASE_CONNECTION_TIMEOUT`: acquire timeout in seconds (default: 30)
/// - `RUN_MIGRATIONS`: apply embedded migrations on startup (default: true)
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    #[serde(default)]
    pub env: Env,
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub database_connection_timeout: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_run_migrations() -> bool {
    true
}

impl UsersConfig {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Load the configuration from an explicit environment source
    pub fn from_environment(source: Environment) -> Result<Self, ConfigError> {
        settings::load(source)
    }

    /// Connection pool settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }
}
