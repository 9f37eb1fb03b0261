//! Logging setup

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::settings::Env;

/// Install the process-wide tracing subscriber for `env`
///
/// `local` logs human-readable lines at debug level, `dev` logs JSON at debug
/// level and `prod` logs JSON at info level. `RUST_LOG` overrides the level.
pub fn init(env: Env) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(env)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env {
        Env::Local => builder.try_init(),
        Env::Dev | Env::Prod => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

fn default_level(env: Env) -> &'static str {
    match env {
        Env::Local | Env::Dev => "debug",
        Env::Prod => "info",
    }
}
