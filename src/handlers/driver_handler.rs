// src/handlers/driver_handler.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    errors::RidelineResult,
    models::{
        audit::AuditRecord,
        driver::{DriverResponse, DriverSignup},
    },
    services::{DriverOperations, LifecycleOperations, ShiftOperations},
    state::AppState,
};

pub async fn register_driver(
    State(state): State<Arc<AppState>>,
    Json(signup): Json<DriverSignup>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(state.driver_service.register_driver(signup).await?))
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(state.driver_service.get_driver(&driver_id).await?))
}

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
) -> RidelineResult<Json<Vec<DriverResponse>>> {
    Ok(Json(state.driver_service.list_drivers().await?))
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    pub online: bool,
}

pub async fn set_presence(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<PresenceRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .driver_service
            .set_online(&driver_id, request.online)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct LifecycleRequest {
    pub actor: String,
    #[serde(default)]
    pub reason: String,
}

pub async fn approve_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<LifecycleRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .lifecycle_service
            .approve(&driver_id, &request.actor)
            .await?,
    ))
}

pub async fn reject_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<LifecycleRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .lifecycle_service
            .reject(&driver_id, &request.actor, &request.reason)
            .await?,
    ))
}

pub async fn suspend_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<LifecycleRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .lifecycle_service
            .suspend(&driver_id, &request.actor, &request.reason)
            .await?,
    ))
}

pub async fn reactivate_driver(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<LifecycleRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .lifecycle_service
            .reactivate(&driver_id, &request.actor)
            .await?,
    ))
}

pub async fn audit_trail(
    State(state): State<Arc<AppState>>,
) -> RidelineResult<Json<Vec<AuditRecord>>> {
    Ok(Json(state.lifecycle_service.audit_trail().await?))
}

#[derive(Debug, Deserialize)]
pub struct StartShiftRequest {
    pub target_km: Option<f64>,
}

pub async fn start_shift(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<StartShiftRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .shift_service
            .start_shift(&driver_id, request.target_km)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct RecordDistanceRequest {
    pub km: f64,
}

pub async fn record_distance(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
    Json(request): Json<RecordDistanceRequest>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(
        state
            .shift_service
            .record_distance(&driver_id, request.km)
            .await?,
    ))
}

pub async fn end_shift(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> RidelineResult<Json<DriverResponse>> {
    Ok(Json(state.shift_service.end_shift(&driver_id).await?))
}
