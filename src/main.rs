use std::sync::{Arc, Mutex};

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use apptbook::config::AppConfig;
use apptbook::db;
use apptbook::handlers;
use apptbook::services::{EmailNotifier, SystemClock};
use apptbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.mail_api_url.is_empty() {
        tracing::warn!("MAIL_API_URL not set, notifications will be dropped");
    }
    let notifier = EmailNotifier::new(
        config.mail_api_url.clone(),
        config.mail_api_key.clone(),
        config.from_email.clone(),
        config.practitioner_email.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier: Arc::new(notifier),
        clock: Arc::new(SystemClock),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/services", get(handlers::bookings::list_services))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings", get(handlers::bookings::list_my_bookings))
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route("/api/admin/bookings", post(handlers::admin::create_booking))
        .route(
            "/api/admin/bookings/:id/status",
            post(handlers::admin::update_booking_status),
        )
        .route("/api/admin/hours", get(handlers::admin::get_hours))
        .route("/api/admin/hours", put(handlers::admin::replace_hours))
        .route("/api/admin/services", get(handlers::admin::list_services))
        .route("/api/admin/services", post(handlers::admin::create_service))
        .route(
            "/api/admin/services/:id",
            put(handlers::admin::update_service),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
