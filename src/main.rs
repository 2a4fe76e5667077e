// src/main.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use rideline::{
    handlers::{driver_handler, report_handler, ride_handler, vehicle_handler},
    state::{AppConfig, AppState},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rideline=info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    let app_state = Arc::new(AppState::new(config).await?);

    let app = Router::new()
        .route(
            "/drivers",
            get(driver_handler::list_drivers).post(driver_handler::register_driver),
        )
        .route("/drivers/:id", get(driver_handler::get_driver))
        .route("/drivers/:id/presence", post(driver_handler::set_presence))
        .route("/drivers/:id/approve", post(driver_handler::approve_driver))
        .route("/drivers/:id/reject", post(driver_handler::reject_driver))
        .route("/drivers/:id/suspend", post(driver_handler::suspend_driver))
        .route(
            "/drivers/:id/reactivate",
            post(driver_handler::reactivate_driver),
        )
        .route("/drivers/:id/shift/start", post(driver_handler::start_shift))
        .route(
            "/drivers/:id/shift/distance",
            post(driver_handler::record_distance),
        )
        .route("/drivers/:id/shift/end", post(driver_handler::end_shift))
        .route("/drivers/:id/rides", get(ride_handler::rides_for_driver))
        .route(
            "/vehicles",
            get(vehicle_handler::list_vehicles).post(vehicle_handler::register_vehicle),
        )
        .route("/vehicles/:id", get(vehicle_handler::get_vehicle))
        .route(
            "/vehicles/:id/condition",
            post(vehicle_handler::set_condition),
        )
        .route("/vehicles/:id/assign", post(vehicle_handler::assign_vehicle))
        .route(
            "/vehicles/:id/unassign",
            post(vehicle_handler::unassign_vehicle),
        )
        .route("/rides/estimate", post(ride_handler::estimate_fare))
        .route("/rides/complete", post(ride_handler::complete_ride))
        .route("/rides/:id", get(ride_handler::get_ride))
        .route("/rides/:id/rating", post(ride_handler::rate_ride))
        .route("/reports/marketplace", get(report_handler::marketplace_report))
        .route("/audit", get(driver_handler::audit_trail))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("rideline listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
