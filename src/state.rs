// src/state.rs
use std::sync::Arc;

use crate::services::{
    AssignmentService, DriverService, LifecycleService, ReportService, RideService, ShiftService,
};
use crate::storage::{memory::MemoryBackend, redis_store::RedisBackend, DocumentStore, StoreBackend};
use crate::utils::clock::{SharedClock, SystemClock, IST_OFFSET_MINUTES};

pub struct AppState {
    pub driver_service: Arc<DriverService>,
    pub lifecycle_service: Arc<LifecycleService>,
    pub shift_service: Arc<ShiftService>,
    pub assignment_service: Arc<AssignmentService>,
    pub ride_service: Arc<RideService>,
    pub report_service: Arc<ReportService>,
    pub store: DocumentStore,
    pub config: AppConfig,
}

#[derive(Clone)]
pub struct AppConfig {
    /// Empty string selects the in-memory backend.
    pub redis_url: String,
    pub bind_addr: String,
    /// Local timezone offset from UTC in minutes; drives the fare
    /// night-surcharge window.
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            redis_url: std::env::var("REDIS_URL").unwrap_or_default(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            utc_offset_minutes: std::env::var("UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(IST_OFFSET_MINUTES),
        }
    }
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let backend: Arc<dyn StoreBackend> = if config.redis_url.is_empty() {
            tracing::warn!("REDIS_URL not set, using in-memory store");
            Arc::new(MemoryBackend::new())
        } else {
            Arc::new(RedisBackend::new(&config.redis_url)?)
        };

        let store = DocumentStore::new(backend);
        let clock: SharedClock = Arc::new(SystemClock::new(config.utc_offset_minutes));

        Ok(Self {
            driver_service: Arc::new(DriverService::new(store.clone(), clock.clone())),
            lifecycle_service: Arc::new(LifecycleService::new(store.clone(), clock.clone())),
            shift_service: Arc::new(ShiftService::new(store.clone(), clock.clone())),
            assignment_service: Arc::new(AssignmentService::new(store.clone(), clock.clone())),
            ride_service: Arc::new(RideService::new(store.clone(), clock.clone())),
            report_service: Arc::new(ReportService::new(store.clone())),
            store,
            config,
        })
    }
}
