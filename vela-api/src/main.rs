use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vela_api::{app, AppState};
use vela_booking::{AvailabilityChecker, LifecycleManager};
use vela_catalog::ExtrasCatalog;
use vela_core::repository::{BoatRepository, ReservationRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vela_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = vela_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Vela API on port {}", config.server.port);

    let db = vela_store::Db::connect(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let boats: Arc<dyn BoatRepository> =
        Arc::new(vela_store::PgBoatRepository::new(db.pool.clone()));
    let reservations: Arc<dyn ReservationRepository> =
        Arc::new(vela_store::PgReservationRepository::new(db.pool.clone()));

    let extras = ExtrasCatalog::default();
    let lifecycle = Arc::new(LifecycleManager::new(
        boats.clone(),
        reservations.clone(),
        extras.clone(),
        config.booking.clone(),
    ));
    let availability = Arc::new(AvailabilityChecker::new(
        reservations.clone(),
        config.booking.buffer_minutes,
    ));

    tokio::spawn(vela_api::reaper::start_hold_reaper(
        reservations.clone(),
        config.booking.reaper_interval_seconds,
    ));

    let app_state = AppState {
        lifecycle,
        availability,
        boats,
        reservations,
        extras,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
