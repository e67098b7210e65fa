use axum::{
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod availability;
pub mod boats;
pub mod error;
pub mod reaper;
pub mod reservations;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route(
            "/v1/reservations",
            post(reservations::create_reservation).get(reservations::list_reservations),
        )
        .route(
            "/v1/reservations/{id}",
            get(reservations::get_reservation).patch(reservations::patch_reservation),
        )
        .route(
            "/v1/reservations/{id}/advance",
            post(reservations::advance_reservation),
        )
        .route(
            "/v1/reservations/{id}/confirm",
            post(reservations::confirm_reservation),
        )
        .route(
            "/v1/reservations/{id}/cancel",
            post(reservations::cancel_reservation),
        )
        .route("/v1/availability", post(availability::probe_availability))
        .route("/v1/boats", get(boats::list_boats))
        .route("/v1/extras", get(boats::list_extras))
        .route("/v1/admin/boats", post(boats::create_boat))
        .route("/v1/admin/boats/{id}", put(boats::update_boat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
