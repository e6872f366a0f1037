//! Carebase API server
//!
//! Main entry point: configuration, logging, storage and the HTTP listener.

use std::process::ExitCode;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use carebase::api::{self, AppState};
use carebase::{config, telemetry};
use tracing::{error, info};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Load configuration
    let config = match config::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logger
    telemetry::init(&config.logging);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("server terminated: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: config::Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)
        .await
        .context("failed to open document store")?;
    let state = web::Data::new(state);

    let addr = (config.server.host.clone(), config.server.port);
    info!(host = %addr.0, port = addr.1, data_dir = %config.storage.data_dir.display(), "starting server");

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            // Add app state
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            // API routes
            .configure(api::configure)
    })
    .bind(addr.clone())
    .with_context(|| format!("failed to bind {}:{}", addr.0, addr.1))?
    .run()
    .await
    .context("server error")
}
