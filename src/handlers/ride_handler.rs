// src/handlers/ride_handler.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    errors::RidelineResult,
    models::ride::{FareBreakdown, FareEstimateRequest, RideCompletion, RideResponse},
    services::RideOperations,
    state::AppState,
};

pub async fn estimate_fare(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FareEstimateRequest>,
) -> RidelineResult<Json<FareBreakdown>> {
    Ok(Json(state.ride_service.estimate_fare(request).await?))
}

pub async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Json(completion): Json<RideCompletion>,
) -> RidelineResult<Json<RideResponse>> {
    Ok(Json(state.ride_service.complete_ride(completion).await?))
}

pub async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(ride_id): Path<String>,
) -> RidelineResult<Json<RideResponse>> {
    Ok(Json(state.ride_service.get_ride(&ride_id).await?))
}

pub async fn rides_for_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> RidelineResult<Json<Vec<RideResponse>>> {
    Ok(Json(state.ride_service.rides_for_driver(&driver_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: u8,
}

pub async fn rate_ride(
    State(state): State<Arc<AppState>>,
    Path(ride_id): Path<String>,
    Json(request): Json<RatingRequest>,
) -> RidelineResult<Json<RideResponse>> {
    Ok(Json(
        state.ride_service.rate_ride(&ride_id, request.rating).await?,
    ))
}
