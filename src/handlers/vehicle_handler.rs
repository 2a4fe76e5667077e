// src/handlers/vehicle_handler.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    errors::RidelineResult,
    models::vehicle::{ConditionState, VehicleRegistration, VehicleResponse},
    services::AssignmentOperations,
    state::AppState,
};

pub async fn register_vehicle(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<VehicleRegistration>,
) -> RidelineResult<Json<VehicleResponse>> {
    Ok(Json(
        state.assignment_service.register_vehicle(registration).await?,
    ))
}

pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
) -> RidelineResult<Json<VehicleResponse>> {
    Ok(Json(state.assignment_service.get_vehicle(&vehicle_id).await?))
}

pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
) -> RidelineResult<Json<Vec<VehicleResponse>>> {
    Ok(Json(state.assignment_service.list_vehicles().await?))
}

#[derive(Debug, Deserialize)]
pub struct ConditionRequest {
    pub condition: ConditionState,
}

pub async fn set_condition(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
    Json(request): Json<ConditionRequest>,
) -> RidelineResult<Json<VehicleResponse>> {
    Ok(Json(
        state
            .assignment_service
            .set_condition(&vehicle_id, request.condition)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub driver_id: String,
    pub actor: String,
}

pub async fn assign_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> RidelineResult<Json<VehicleResponse>> {
    Ok(Json(
        state
            .assignment_service
            .assign(&vehicle_id, &request.driver_id, &request.actor)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UnassignRequest {
    pub actor: String,
}

pub async fn unassign_vehicle(
    State(state): State<Arc<AppState>>,
    Path(vehicle_id): Path<String>,
    Json(request): Json<UnassignRequest>,
) -> RidelineResult<Json<VehicleResponse>> {
    Ok(Json(
        state
            .assignment_service
            .unassign(&vehicle_id, &request.actor)
            .await?,
    ))
}
