/// Upload Service - HTTP Server
///
/// Accepts video uploads, fans metadata out to the catalog and search
/// services, and transcodes to HLS in the background.
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upload_service::handlers;
use upload_service::lifecycle::{shutdown_signal, PortGuard, ShutdownCoordinator};
use upload_service::services::notify::{build_http_client, CatalogClient, SearchClient};
use upload_service::services::video::FfmpegTranscoder;
use upload_service::services::{
    BackgroundTasks, IngestPipeline, LocalStorage, Notifier, Transcoder, VideoCatalog,
};
use upload_service::Config;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "upload_service=info,info".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env for local runs
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    let storage = LocalStorage::new(config.storage.upload_dir.clone());
    storage.ensure_root().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.storage.upload_dir.display()
        )
    })?;

    let http = build_http_client(&config.downstream).context("Failed to build HTTP client")?;
    let catalog = Arc::new(CatalogClient::new(
        http.clone(),
        &config.app,
        &config.downstream,
    ));
    let search: Arc<dyn Notifier> = Arc::new(SearchClient::new(http, &config.downstream));
    let transcoder: Arc<dyn Transcoder> = Arc::new(FfmpegTranscoder::new(
        &config.transcode,
        config.storage.upload_dir.clone(),
    ));

    // Detached work runs on the main runtime, not on an HTTP worker
    let tasks = BackgroundTasks::new(
        tokio::runtime::Handle::current(),
        config.transcode.concurrency_limit(),
    );

    let pipeline = IngestPipeline::new(
        storage,
        catalog.clone(),
        search,
        transcoder,
        tasks.clone(),
        config.app.public_url.clone(),
    );
    let catalog_reader: Arc<dyn VideoCatalog> = catalog;

    let listener = PortGuard::new(config.app.host.clone(), config.app.port, &config.lifecycle)
        .acquire()
        .await
        .with_context(|| format!("Failed to bind port {}", config.app.port))?;

    tracing::info!(
        host = %config.app.host,
        port = config.app.port,
        upload_dir = %config.storage.upload_dir.display(),
        "Upload service listening"
    );

    let grace = Duration::from_secs(config.lifecycle.shutdown_grace_secs);
    let config_data = web::Data::new(config.clone());
    let pipeline_data = web::Data::new(pipeline);
    let catalog_data: web::Data<dyn VideoCatalog> = web::Data::from(catalog_reader);
    let cors_config = config.cors.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(pipeline_data.clone())
            .app_data(catalog_data.clone())
            .wrap(handlers::build_cors(&cors_config))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .disable_signals()
    .shutdown_timeout(grace.as_secs())
    .listen(listener)
    .context("Failed to start HTTP server")?
    .run();

    let coordinator = ShutdownCoordinator::new(server.handle(), tasks);
    actix_rt::spawn(coordinator.run(shutdown_signal()));

    server.await.context("HTTP server error")?;
    tracing::info!("Upload service shut down");
    Ok(())
}
