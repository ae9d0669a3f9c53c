#![doc = include_str!("../README.md")]

mod server;

use anyhow::Context;
use clap::Parser;
use server::{
    config::{CliArgs, ServerConfig},
    gateway, health,
    notify::{SmtpMailer, Template},
    schedule,
    service::WordService,
    store::PgWordStore,
    telemetry::init_telemetry,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal, task::JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use wotd_tonic_core::proto::{
    FILE_DESCRIPTOR_SET, my_word_of_the_day_service_server::MyWordOfTheDayServiceServer,
};

type Service = WordService<PgWordStore, PgWordStore>;
type GrpcService = MyWordOfTheDayServiceServer<Service>;

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

    let providers = init_telemetry(config.log_format)?;
    log_startup_info(&config);

    let store = PgWordStore::connect(&config.database)
        .await
        .context("unable to connect to database")?;
    store
        .migrate()
        .await
        .context("unable to apply database migrations")?;
    let store = Arc::new(store);

    let service = WordService::new(store.clone(), store.clone());
    let token = CancellationToken::new();
    let mut tasks = JoinSet::new();

    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter.set_serving::<GrpcService>().await;
    tasks.spawn(health::watch::<GrpcService, _>(
        health_reporter.clone(),
        PgWordStore::clone(&store),
        config.health_check_interval,
        token.clone(),
    ));

    if let Some(mail) = &config.mail {
        let template = match &mail.template {
            Some(path) => Template::from_file(path)?,
            None => Template::embedded(),
        };
        let mailer = SmtpMailer::new(mail, template).context("invalid SMTP configuration")?;
        tasks.spawn(schedule::run(
            mail.schedule.clone(),
            store.clone(),
            Arc::new(mailer),
            token.clone(),
        ));
    }

    if let Some(addr) = config.gateway_addr {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("unable to bind gateway to {addr}"))?;
        tracing::info!(%addr, "Serving REST gateway under /api");
        let service = service.clone();
        let token = token.clone();
        tasks.spawn(async move {
            if let Err(err) = gateway::serve(listener, service, token).await {
                tracing::error!(error = %err, "REST gateway stopped");
            }
        });
    }

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    let listener = TcpListener::bind(config.grpc_addr)
        .await
        .with_context(|| format!("unable to bind gRPC server to {}", config.grpc_addr))?;
    tracing::info!(addr = %config.grpc_addr, "Serving gRPC");

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
        .add_service(build_word_service(service))
        .serve_with_incoming_shutdown(
            TcpListenerStream::new(listener),
            shutdown_signal(health_reporter, token),
        )
        .await?;

    while tasks.join_next().await.is_some() {}

    store.close().await;
    providers.shutdown();
    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting word service with full config: {config:#?}");
    } else {
        tracing::info!(
            grpc = %config.grpc_addr,
            gateway = config.gateway_addr.is_some(),
            mail = config.mail.is_some(),
            "Starting word service"
        );
    }
}

fn build_word_service(service: Service) -> GrpcService {
    MyWordOfTheDayServiceServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(health_reporter: HealthReporter, token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    // 1. Stop the scheduler, health watcher and gateway
    token.cancel();

    // 2. Publish the status
    health_reporter.set_not_serving::<GrpcService>().await;
}
