use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use common::{shutdown::shutdown_signal, telemetry};
use tokio::net::TcpListener;
use tracing::info;

use api::{
    config::ApiConfig, routes, service::UserServiceImpl, state::AppState,
    storage::grpc::GrpcUserStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ApiConfig::from_env()?;

    // Initialize logging
    telemetry::init(config.env)?;

    info!("Starting API service");

    // Users are reached over gRPC, one connection per call
    let storage = GrpcUserStorage::new(config.users_service_endpoint());
    info!("Forwarding user operations to {}", storage.endpoint());

    let service = UserServiceImpl::new(storage);
    let app_state = AppState::new(Arc::new(service), config.request_timeout());

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API service stopped");
    Ok(())
}
