// src/services/shift.rs
use async_trait::async_trait;
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::driver::{CompensationModel, DriverResponse, Shift, DEFAULT_SHIFT_TARGET_KM},
    storage::DocumentStore,
    utils::clock::SharedClock,
};

#[async_trait]
pub trait ShiftOperations: Send + Sync {
    async fn start_shift(
        &self,
        driver_id: &str,
        target_km: Option<f64>,
    ) -> RidelineResult<DriverResponse>;
    async fn record_distance(&self, driver_id: &str, km: f64) -> RidelineResult<DriverResponse>;
    async fn end_shift(&self, driver_id: &str) -> RidelineResult<DriverResponse>;
}

/// Shift tracking for fleet drivers. One active shift at a time; ended
/// shifts are retained in the driver's history for earnings review.
pub struct ShiftService {
    store: DocumentStore,
    clock: SharedClock,
}

impl ShiftService {
    pub fn new(store: DocumentStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl ShiftOperations for ShiftService {
    async fn start_shift(
        &self,
        driver_id: &str,
        target_km: Option<f64>,
    ) -> RidelineResult<DriverResponse> {
        if let Some(target) = target_km {
            if target <= 0.0 || !target.is_finite() {
                return Err(AppError::validation_error(
                    "target_km",
                    "Shift target must be a positive number",
                ));
            }
        }

        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        match &mut driver.compensation_model {
            CompensationModel::Owner { .. } => {
                return Err(AppError::NotFleetDriver(driver_id.to_string()));
            }
            CompensationModel::Fleet { current_shift, .. } => {
                if current_shift.as_ref().is_some_and(|s| s.is_active) {
                    return Err(AppError::ShiftAlreadyActive(driver_id.to_string()));
                }

                *current_shift = Some(Shift {
                    started_at: self.clock.now(),
                    target_km: target_km.unwrap_or(DEFAULT_SHIFT_TARGET_KM),
                    completed_km: 0.0,
                    is_active: true,
                    ended_at: None,
                });
            }
        }

        driver.updated_at = self.clock.now();
        self.store.put_driver(&driver).await?;

        tracing::info!("Shift started for driver {}", driver_id);

        Ok(driver.into())
    }

    async fn record_distance(&self, driver_id: &str, km: f64) -> RidelineResult<DriverResponse> {
        if km < 0.0 || !km.is_finite() {
            return Err(AppError::validation_error(
                "km",
                "Recorded distance must be a non-negative number",
            ));
        }

        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        match &mut driver.compensation_model {
            CompensationModel::Owner { .. } => {
                return Err(AppError::NotFleetDriver(driver_id.to_string()));
            }
            CompensationModel::Fleet { current_shift, .. } => match current_shift {
                Some(shift) if shift.is_active => {
                    // Raw accumulation; progress clamping is display-only
                    shift.completed_km += km;
                }
                _ => return Err(AppError::NoActiveShift(driver_id.to_string())),
            },
        }

        driver.updated_at = self.clock.now();
        self.store.put_driver(&driver).await?;

        Ok(driver.into())
    }

    async fn end_shift(&self, driver_id: &str) -> RidelineResult<DriverResponse> {
        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        let now = self.clock.now();

        match &mut driver.compensation_model {
            CompensationModel::Owner { .. } => {
                return Err(AppError::NotFleetDriver(driver_id.to_string()));
            }
            CompensationModel::Fleet { current_shift, shift_history, .. } => {
                let mut shift = match current_shift.take() {
                    Some(shift) if shift.is_active => shift,
                    other => {
                        // Put back whatever inactive leftover was there
                        *current_shift = other;
                        return Err(AppError::NoActiveShift(driver_id.to_string()));
                    }
                };

                shift.is_active = false;
                shift.ended_at = Some(now);

                let elapsed_hours =
                    (now - shift.started_at).num_seconds().max(0) as f64 / 3600.0;
                driver.stats.online_hours += elapsed_hours;

                tracing::info!(
                    "Shift ended for driver {}: {:.1} km over {:.2} h",
                    driver_id,
                    shift.completed_km,
                    elapsed_hours
                );

                shift_history.push(shift);
            }
        }

        driver.updated_at = now;
        self.store.put_driver(&driver).await?;

        Ok(driver.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::{Driver, DriverStats, LifecycleStatus};
    use crate::storage::memory::MemoryBackend;
    use crate::utils::clock::FixedClock;
    use crate::utils::money::rupees;
    use chrono::Duration;
    use std::sync::Arc;

    fn fleet_driver(id: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9800000001".to_string(),
            license_number: "DL-123".to_string(),
            compensation_model: CompensationModel::Fleet {
                salary_per_km: rupees(12),
                assigned_vehicle_id: None,
                current_shift: None,
                shift_history: vec![],
            },
            lifecycle_status: LifecycleStatus::Active,
            is_online: false,
            documents_verified: true,
            approved_at: None,
            stats: DriverStats::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn owner_driver(id: &str) -> Driver {
        Driver {
            compensation_model: CompensationModel::Owner {
                commission_rate: 0.2,
                vehicle_number: "KA-01-AB-0001".to_string(),
            },
            ..fleet_driver(id)
        }
    }

    async fn setup(driver: Driver) -> (ShiftService, DocumentStore, FixedClock) {
        let store = DocumentStore::new(Arc::new(MemoryBackend::new()));
        store.put_driver(&driver).await.unwrap();
        let clock = FixedClock::at_hour(9);
        let service = ShiftService::new(store.clone(), Arc::new(clock.clone()));
        (service, store, clock)
    }

    #[tokio::test]
    async fn test_owner_cannot_start_shift() {
        let (service, _, _) = setup(owner_driver("drv-250615-owner")).await;
        let err = service.start_shift("drv-250615-owner", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFleetDriver(_)));
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let (service, _, _) = setup(fleet_driver("drv-250615-fleet")).await;
        service.start_shift("drv-250615-fleet", Some(80.0)).await.unwrap();

        let err = service.start_shift("drv-250615-fleet", None).await.unwrap_err();
        assert!(matches!(err, AppError::ShiftAlreadyActive(_)));
    }

    #[tokio::test]
    async fn test_default_target_applied() {
        let (service, _, _) = setup(fleet_driver("drv-250615-fleet")).await;
        let response = service.start_shift("drv-250615-fleet", None).await.unwrap();
        let shift = response.current_shift.unwrap();
        assert!((shift.target_km - DEFAULT_SHIFT_TARGET_KM).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_distance_accumulates_and_never_decreases() {
        let (service, _, _) = setup(fleet_driver("drv-250615-fleet")).await;
        service.start_shift("drv-250615-fleet", Some(50.0)).await.unwrap();

        let mut last = 0.0;
        for km in [12.5, 0.0, 7.5, 40.0] {
            let response = service.record_distance("drv-250615-fleet", km).await.unwrap();
            let completed = response.current_shift.unwrap().completed_km;
            assert!(completed >= last);
            last = completed;
        }
        // Raw distance may exceed the target
        assert!((last - 60.0).abs() < f64::EPSILON);

        let err = service
            .record_distance("drv-250615-fleet", -1.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_record_without_shift_fails() {
        let (service, _, _) = setup(fleet_driver("drv-250615-fleet")).await;
        let err = service
            .record_distance("drv-250615-fleet", 5.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoActiveShift(_)));
    }

    #[tokio::test]
    async fn test_end_shift_accumulates_online_hours_and_keeps_history() {
        let (service, store, clock) = setup(fleet_driver("drv-250615-fleet")).await;
        service.start_shift("drv-250615-fleet", Some(50.0)).await.unwrap();
        service.record_distance("drv-250615-fleet", 30.0).await.unwrap();

        clock.advance(Duration::hours(6));
        let response = service.end_shift("drv-250615-fleet").await.unwrap();
        assert!(response.current_shift.is_none());
        assert!((response.online_hours - 6.0).abs() < 1e-9);

        let driver = store.get_driver("drv-250615-fleet").await.unwrap().unwrap();
        match &driver.compensation_model {
            CompensationModel::Fleet { shift_history, .. } => {
                assert_eq!(shift_history.len(), 1);
                assert!(!shift_history[0].is_active);
                assert!((shift_history[0].completed_km - 30.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected fleet driver"),
        }

        let err = service.end_shift("drv-250615-fleet").await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveShift(_)));
    }

    #[tokio::test]
    async fn test_restart_resets_completed_km() {
        let (service, _, clock) = setup(fleet_driver("drv-250615-fleet")).await;
        service.start_shift("drv-250615-fleet", Some(50.0)).await.unwrap();
        service.record_distance("drv-250615-fleet", 20.0).await.unwrap();
        clock.advance(Duration::hours(2));
        service.end_shift("drv-250615-fleet").await.unwrap();

        let response = service.start_shift("drv-250615-fleet", None).await.unwrap();
        let shift = response.current_shift.unwrap();
        assert_eq!(shift.completed_km, 0.0);
        assert!(shift.is_active);
    }
}
