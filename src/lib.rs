use std::path::Path;

use crate::config::StoreKind;
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod learning;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "learnpath";

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;

    let mm = match config.app().store() {
        StoreKind::Postgres => {
            let db = DbConnection::connect(config.app().database_uri())?;
            db.migrate(Path::new("./migrations")).await?;
            ModelManager::postgres(db)
        }
        StoreKind::Memory => {
            tracing::warn!("using the in-memory store, nothing will be persisted");
            ModelManager::in_memory()
        }
    };

    build_server_with_store(mm).await
}

/// Router over an already prepared store, with the local configuration.
pub async fn build_server_with_store(mm: ModelManager) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;

    let state = AppState::new(mm, config);
    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

pub async fn build_server_with_pool(db: DbConnection) -> AppResult<(AppState, Router)> {
    build_server_with_store(ModelManager::postgres(db)).await
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let config = state.config();
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!(
        "axum is starting at: {} ({} store)",
        config.host().bindto(),
        state.mm().store().kind()
    );
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
