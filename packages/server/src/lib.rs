#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the fish census platform.
//!
//! Serves the REST API for browsing municipalities, communities, and
//! census series, accepts authenticated CSV imports, and streams XLSX
//! and PDF exports. All queries go through one shared `PostgreSQL`
//! connection; there is no in-process cache.

pub mod auth;
mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use fishcensus_database::{db, run_migrations};
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// `PostgreSQL` database connection for all queries.
    pub db: Arc<dyn Database>,
    /// Signing secret for API bearer tokens.
    pub api_secret: String,
}

/// Starts the fish census API server.
///
/// Connects to the database, runs migrations, and starts the Actix-Web
/// HTTP server. This is a regular async function — the caller is
/// responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind
/// or encounters a runtime error.
///
/// # Panics
///
/// Panics if the database connection fails, migrations fail, or the
/// token secret is not configured.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to database...");
    let db_conn = db::connect_from_env()
        .await
        .expect("Failed to connect to database");

    log::info!("Running migrations...");
    run_migrations(db_conn.as_ref())
        .await
        .expect("Failed to run migrations");

    let api_secret = std::env::var(auth::API_SECRET_ENV)
        .unwrap_or_else(|_| panic!("{} must be set", auth::API_SECRET_ENV));

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
        api_secret,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/municipalities", web::get().to(handlers::municipalities))
                    .route(
                        "/municipalities/{id}/communities",
                        web::get().to(handlers::municipality_communities),
                    )
                    .route(
                        "/municipalities/{id}/summary",
                        web::get().to(handlers::municipality_summary),
                    )
                    .route(
                        "/municipalities/{id}/export/xlsx",
                        web::get().to(handlers::municipality_xlsx),
                    )
                    .route("/communities/{id}", web::get().to(handlers::community_detail))
                    .route(
                        "/communities/{id}/census",
                        web::get().to(handlers::community_census),
                    )
                    .route(
                        "/communities/{id}/environments",
                        web::post().to(handlers::link_environment),
                    )
                    .route(
                        "/communities/{id}/export/xlsx",
                        web::get().to(handlers::community_xlsx),
                    )
                    .route(
                        "/communities/{id}/export/pdf",
                        web::get().to(handlers::community_pdf),
                    )
                    .route("/motivations", web::get().to(handlers::motivations))
                    .route("/environments", web::get().to(handlers::environments))
                    .route("/environments", web::post().to(handlers::create_environment))
                    .route("/import/{kind}", web::post().to(handlers::import))
                    .route("/imports/{id}", web::get().to(handlers::import_log)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
