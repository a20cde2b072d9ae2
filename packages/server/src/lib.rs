#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for SecureCheck.
//!
//! Serves the JSON API behind the four pages of the dashboard (home log
//! table, analytics, query runner and predict form) and, when
//! `FRONTEND_DIR` is set, the built frontend as static files. Every
//! request reads the store afresh; nothing is cached.

pub mod config;
mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use securecheck_analytics::Analytics;
use securecheck_database::DataAccess;
use securecheck_database_models::ConnectionPolicy;

pub use config::{ConfigError, ServerConfig, Settings};

/// Shared application state.
pub struct AppState {
    /// Analytics engine over the log store.
    pub analytics: Analytics,
}

impl AppState {
    /// Builds the state from the database settings.
    ///
    /// Uses a persistent connection unless another policy was configured.
    /// No connection is opened until the first request.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let policy = settings.database.policy_or(ConnectionPolicy::Persistent);
        let access = DataAccess::postgres(settings.database.connection.clone(), policy);
        Self {
            analytics: Analytics::new(access),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/logs", web::get().to(handlers::logs))
            .route("/analytics", web::get().to(handlers::analytics))
            .route("/queries", web::get().to(handlers::queries))
            .route("/queries/{id}", web::get().to(handlers::run_query))
            .route("/predict/options", web::get().to(handlers::predict_options))
            .route("/predict", web::post().to(handlers::predict)),
    );
}

/// Starts the SecureCheck API server with settings from the environment.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, or
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let settings = Settings::load().map_err(std::io::Error::other)?;
    serve(settings).await
}

/// Starts the SecureCheck API server with the given settings.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(settings: Settings) -> std::io::Result<()> {
    let db = &settings.database.connection;
    log::info!(
        "Using log store at {}:{}/{} ({})",
        db.host,
        db.port,
        db.database,
        settings.database.policy_or(ConnectionPolicy::Persistent)
    );

    let state = web::Data::new(AppState::from_settings(&settings));
    let ServerConfig {
        bind_addr,
        port,
        frontend_dir,
    } = settings.server;

    if let Some(dir) = &frontend_dir {
        log::info!("Serving frontend from {}", dir.display());
    }
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure);

        match &frontend_dir {
            Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
