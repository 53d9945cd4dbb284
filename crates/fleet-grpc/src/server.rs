use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tracing::{error, info};

use fleet_domain::DeviceManagementService;
use fleet_proto::device::v1::device_management_server::DeviceManagementServer;

use crate::handler::DeviceManagementHandler;

/// Build the reflection service from the compiled file descriptor set.
fn build_reflection_service(
) -> Result<
    tonic_reflection::server::ServerReflectionServer<
        impl tonic_reflection::server::ServerReflection,
    >,
    anyhow::Error,
> {
    let service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(fleet_proto::device::v1::FILE_DESCRIPTOR_SET)
        .build_v1()?;
    Ok(service)
}

/// gRPC server configuration.
pub struct GrpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GrpcServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
        }
    }
}

/// Run the gRPC server with graceful shutdown.
pub async fn run_grpc_server(
    config: GrpcServerConfig,
    domain_service: Arc<DeviceManagementService>,
    cancellation_token: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Starting gRPC server on {}", addr);

    let handler = DeviceManagementHandler::new(domain_service);
    let reflection_service = build_reflection_service()?;

    let server = Server::builder()
        .add_service(reflection_service)
        .add_service(DeviceManagementServer::new(handler))
        .serve_with_shutdown(addr, async move {
            cancellation_token.cancelled().await;
            info!("gRPC server shutdown signal received");
        });

    match server.await {
        Ok(_) => {
            info!("gRPC server stopped gracefully");
            Ok(())
        }
        Err(e) => {
            error!("gRPC server error: {}", e);
            Err(e.into())
        }
    }
}
