mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleet_domain::{
    action_queue, ActionExecutor, DeviceManagementService, InMemoryActionTracker,
    InMemoryDeviceRegistry, SimulatedUpdateEffect,
};
use fleet_grpc::{run_grpc_server, GrpcServerConfig};

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting fleet device management service");
    info!("Configuration: {:?}", config);

    if let Err(e) = run(config).await {
        error!("Service exited with error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: config::ServiceConfig) -> Result<()> {
    let registry = Arc::new(InMemoryDeviceRegistry::new());
    let tracker = Arc::new(InMemoryActionTracker::new());
    let effect = Arc::new(SimulatedUpdateEffect::new(Duration::from_secs(
        config.update_duration_secs,
    )));

    let (dispatcher, queue) = action_queue(config.action_queue_capacity);
    let executor = ActionExecutor::new(registry.clone(), tracker.clone(), effect, queue);

    let domain_service = Arc::new(DeviceManagementService::new(
        registry,
        tracker,
        Arc::new(dispatcher),
    ));

    let shutdown = CancellationToken::new();
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    {
        let shutdown = shutdown.clone();
        tasks.spawn(async move {
            executor.run(shutdown).await;
            Ok(())
        });
    }

    {
        let shutdown = shutdown.clone();
        let server_config = GrpcServerConfig {
            host: config.host.clone(),
            port: config.port,
        };
        tasks.spawn(async move { run_grpc_server(server_config, domain_service, shutdown).await });
    }

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping service");
            shutdown.cancel();
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Err(e))) => error!("Task failed: {}", e),
                Some(Err(e)) => error!("Task panicked: {}", e),
                _ => {}
            }
            shutdown.cancel();
        }
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Err(e)) => error!("Task failed during shutdown: {}", e),
            Err(e) => error!("Task panicked during shutdown: {}", e),
            _ => {}
        }
    }

    info!("Service stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
