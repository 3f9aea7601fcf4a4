#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use futures::Stream;
use server::catalog::Catalog;
use server::config::{CliArgs, ServerConfig};
use server::gateway;
use server::service::handler::CatalogService;
use server::telemetry::init_telemetry;
use spud_tonic_core::proto::{FILE_DESCRIPTOR_SET, potato_service_server::PotatoServiceServer};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry(config.debug, config.dev_mode)?;
    log_startup_info(&config);

    let grpc_listener = TcpListener::bind(config.grpc_addr)
        .await
        .with_context(|| format!("failed to listen for gRPC on {}", config.grpc_addr))?;
    let http_listener = TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("failed to listen for HTTP on {}", config.http_addr))?;

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<PotatoServiceServer<CatalogService>>()
        .await;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(health_reporter, shutdown.clone()));

    tracing::info!("Starting gRPC server on {}", config.grpc_addr);
    let grpc = run_grpc_with_incoming(
        TcpListenerStream::new(grpc_listener),
        health_service,
        shutdown.clone(),
    );

    tracing::info!("Starting server on {}", config.http_addr);
    let app = gateway::router(gateway::connect_lazy(config.potato_endpoint.clone()));
    let http = async {
        axum::serve(
            http_listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("could not run HTTP gateway")
    };

    // Either server failing takes the other one down with it.
    let result = tokio::try_join!(
        async {
            let res = grpc.await;
            if res.is_err() {
                shutdown.cancel();
            }
            res
        },
        async {
            let res = http.await;
            if res.is_err() {
                shutdown.cancel();
            }
            res
        },
    );

    tracing::info!("Service shut down");
    providers.shutdown();
    result.map(|_| ())
}

async fn run_grpc_with_incoming<I, IO, IE>(
    incoming: I,
    health_service: tonic_health::pb::health_server::HealthServer<
        impl tonic_health::pb::health_server::Health,
    >,
    shutdown: CancellationToken,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_potato_service(CatalogService::new(Catalog::sample())))
        .serve_with_incoming_shutdown(incoming, shutdown.cancelled_owned())
        .await
        .context("failed to serve gRPC")?;

    tracing::info!("gRPC server stopped");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::debug!("Starting potato service with full config: {:#?}", config);
    }
    tracing::info!("{}", config.endpoints());
}

fn build_potato_service(service: CatalogService) -> PotatoServiceServer<CatalogService> {
    PotatoServiceServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(health_reporter: HealthReporter, shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
        () = shutdown.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    // 1. Publish the status
    health_reporter
        .set_not_serving::<PotatoServiceServer<CatalogService>>()
        .await;

    // 2. Drain both servers
    shutdown.cancel();
}
