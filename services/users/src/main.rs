use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use common::{
    database::{health_check, init_pool},
    shutdown::shutdown_signal,
    telemetry,
};
use tokio::net::TcpListener;
use tracing::info;

use users::{
    config::UsersConfig,
    grpc,
    service::UserServiceImpl,
    storage::postgres::{PgUserStorage, run_migrations},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = UsersConfig::from_env()?;

    // Initialize logging
    telemetry::init(config.env)?;

    info!("Starting users service");

    // Initialize database connection pool
    let pool = init_pool(&config.database()).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    let storage = PgUserStorage::new(pool.clone());
    let service = Arc::new(UserServiceImpl::new(storage));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.grpc_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Users service listening on {}", addr);

    grpc::serve(listener, service, shutdown_signal()).await?;

    pool.close().await;
    info!("Users service stopped");

    Ok(())
}
