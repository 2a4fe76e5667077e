// src/handlers/report_handler.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    errors::RidelineResult,
    services::{MarketplaceReport, ReportOperations},
    state::AppState,
};

const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub top_n: Option<usize>,
}

pub async fn marketplace_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
) -> RidelineResult<Json<MarketplaceReport>> {
    Ok(Json(
        state
            .report_service
            .marketplace_report(query.top_n.unwrap_or(DEFAULT_TOP_N))
            .await?,
    ))
}
