//! API service configuration

use std::time::Duration;

use common::settings::{self, Env};
use config::{ConfigError, Environment};
use serde::Deserialize;

/// Settings of the API service, read once at startup
///
/// # Environment Variables
/// - `ENV`: `local`, `dev` or `prod` (default: `local`)
/// - `HTTP_PORT`: port the HTTP server listens on (default: 8080)
/// - `USERS_SERVICE_HOST`: host of the users gRPC service (default: 127.0.0.1)
/// - `USERS_SERVICE_PORT`: port of the users gRPC service (default: 50051)
/// - `REQUEST_TIMEOUT_SECS`: deadline given to every inbound request (default: 10)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Env,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_users_service_host")]
    pub users_service_host: String,
    #[serde(default = "default_users_service_port")]
    pub users_service_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_http_port() -> u16 {
    8080
}

fn default_users_service_host() -> String {
    "127.0.0.1".to_string()
}

fn default_users_service_port() -> u16 {
    50051
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl ApiConfig {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Load the configuration from an explicit environment source
    pub fn from_environment(source: Environment) -> Result<Self, ConfigError> {
        settings::load(source)
    }

    /// gRPC endpoint of the users service
    pub fn users_service_endpoint(&self) -> String {
        format!(
            "http://{}:{}",
            self.users_service_host, self.users_service_port
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
