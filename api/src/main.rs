//! Paseo booking API
//!
//! Slot booking for a dog-walking marketplace: walkers declare availability,
//! customers reserve it, and both sides rate the walk once it is done.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;
mod migration;

#[cfg(test)]
mod test_utils;


use adapters::{PostgresCatalogRepository, PostgresStore};
use app::{BookingCommands, TransactionCoordinator};
use config::{Config, RateLimit};
use domain::ports::{CatalogRepository, SystemClock, TransactionalStore};

/// Application state shared across all handlers
pub struct AppState<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    pub commands: Arc<BookingCommands<S, C>>,
}

impl<S, C> Clone for AppState<S, C>
where
    S: TransactionalStore,
    C: CatalogRepository,
{
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router over any store and catalog
pub fn router<S, C>(
    state: AppState<S, C>,
    booking_rate_limit: Option<RateLimit>,
) -> anyhow::Result<Router>
where
    S: TransactionalStore,
    C: CatalogRepository + 'static,
{
    let mut booking_routes =
        Router::new().route("/reservations", post(handlers::create_reservation::<S, C>));

    if let Some(limit) = booking_rate_limit {
        // Keyed by peer address; needs connect info on the server
        let governor_config = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(PeerIpKeyExtractor)
                .per_millisecond((1000 / limit.per_second.max(1)).max(1))
                .burst_size(limit.burst)
                .finish()
                .context("Invalid booking rate limit")?,
        );
        booking_routes = booking_routes.layer(GovernorLayer {
            config: governor_config,
        });
    }

    let protected = Router::new()
        // Slots
        .route(
            "/walkers/:walker_id/slots",
            post(handlers::create_slots::<S, C>).get(handlers::list_slots::<S, C>),
        )
        .route(
            "/slots/:slot_id",
            get(handlers::get_slot::<S, C>).delete(handlers::delete_slot::<S, C>),
        )
        // Reservations
        .merge(booking_routes)
        .route("/reservations/:id", get(handlers::get_reservation::<S, C>))
        .route(
            "/reservations/:id/confirm",
            post(handlers::confirm_reservation::<S, C>),
        )
        .route(
            "/reservations/:id/cancel",
            post(handlers::cancel_reservation::<S, C>),
        )
        .route(
            "/reservations/:id/complete",
            post(handlers::complete_reservation::<S, C>),
        )
        .route(
            "/customers/:customer_id/reservations",
            get(handlers::list_customer_reservations::<S, C>),
        )
        .route(
            "/walkers/:walker_id/reservations",
            get(handlers::list_walker_reservations::<S, C>),
        )
        // Ratings
        .route(
            "/reservations/:id/ratings",
            post(handlers::submit_rating::<S, C>),
        )
        .route(
            "/walkers/:walker_id/rating",
            get(handlers::walker_rating::<S, C>),
        )
        .route_layer(middleware::from_fn(auth::actor_middleware));

    Ok(Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(protected)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paseo_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Paseo API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    if config.run_migrations {
        migration::Migrator::up(&db, None)
            .await
            .context("Failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    // Create adapters and the booking core
    let store = Arc::new(PostgresStore::new(db.clone()));
    let catalog = Arc::new(PostgresCatalogRepository::new(db));
    let coordinator = Arc::new(TransactionCoordinator::new(store, config.tx_deadline));
    let commands = Arc::new(BookingCommands::new(
        coordinator,
        catalog,
        Arc::new(SystemClock),
    ));

    let app = router(AppState { commands }, config.booking_rate_limit)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
