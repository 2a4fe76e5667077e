// src/services/ride_service.rs
use async_trait::async_trait;
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::{
        driver::{CompensationModel, LifecycleStatus},
        ride::{
            FareBreakdown, FareEstimateRequest, Ride, RideCompletion, RideResponse, RideStatus,
        },
    },
    services::{compensation::CompensationSplitter, fare::FareCalculator},
    storage::DocumentStore,
    utils::clock::SharedClock,
    utils::id_generator::{IdGenerator, IdType},
    utils::money::format_rupees,
};

#[async_trait]
pub trait RideOperations: Send + Sync {
    async fn estimate_fare(&self, request: FareEstimateRequest) -> RidelineResult<FareBreakdown>;
    async fn complete_ride(&self, completion: RideCompletion) -> RidelineResult<RideResponse>;
    async fn rate_ride(&self, ride_id: &str, rating: u8) -> RidelineResult<RideResponse>;
    async fn get_ride(&self, ride_id: &str) -> RidelineResult<RideResponse>;
    async fn rides_for_driver(&self, driver_id: &str) -> RidelineResult<Vec<RideResponse>>;
}

/// Turns a completed ride event into money movements: fare, split, ledger
/// record, driver cumulative stats, and active-shift distance.
pub struct RideService {
    store: DocumentStore,
    fare_calculator: FareCalculator,
    clock: SharedClock,
}

impl RideService {
    pub fn new(store: DocumentStore, clock: SharedClock) -> Self {
        Self {
            store,
            fare_calculator: FareCalculator::new(clock.clone()),
            clock,
        }
    }
}

#[async_trait]
impl RideOperations for RideService {
    async fn estimate_fare(&self, request: FareEstimateRequest) -> RidelineResult<FareBreakdown> {
        self.fare_calculator.estimate(&request)
    }

    async fn complete_ride(&self, completion: RideCompletion) -> RidelineResult<RideResponse> {
        if completion.distance_km < 0.0 || !completion.distance_km.is_finite() {
            return Err(AppError::validation_error(
                "distance_km",
                "Distance must be a non-negative number",
            ));
        }

        let mut driver = self
            .store
            .get_driver(&completion.driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(&completion.driver_id))?;

        if driver.lifecycle_status != LifecycleStatus::Active {
            return Err(AppError::NotEligible(format!(
                "driver {} has lifecycle status {}",
                driver.id,
                driver.lifecycle_status.as_str()
            )));
        }

        // A fleet payout only makes sense against a company vehicle the
        // driver actually holds.
        if driver.compensation_model.is_fleet()
            && driver.compensation_model.assigned_vehicle_id().is_none()
        {
            return Err(AppError::NotEligible(format!(
                "fleet driver {} has no assigned vehicle",
                driver.id
            )));
        }

        let now = self.clock.now();
        let fare = FareCalculator::quote(
            completion.distance_km,
            completion.vehicle_class,
            completion.purpose,
            self.clock.local_hour(),
        );
        let split =
            CompensationSplitter::split(fare.total, completion.distance_km, &driver.compensation_model);

        let ride = Ride {
            id: IdGenerator::generate(IdType::Ride),
            driver_id: driver.id.clone(),
            vehicle_class: completion.vehicle_class,
            purpose: completion.purpose,
            status: RideStatus::Completed,
            fare: fare.clone(),
            driver_payout: split.driver_payout,
            platform_share: split.platform_share,
            rating: None,
            completed_at: Some(now),
            created_at: now,
        };

        // Cumulative stats only ever grow
        driver.stats.total_rides += 1;
        driver.stats.total_earnings += split.driver_payout;
        driver.stats.total_km_driven += completion.distance_km;
        driver.stats.rides_offered += 1;
        driver.stats.rides_accepted += 1;

        if let CompensationModel::Fleet { current_shift: Some(shift), .. } =
            &mut driver.compensation_model
        {
            if shift.is_active {
                shift.completed_km += completion.distance_km;
            }
        }

        driver.updated_at = now;
        self.store.put_driver(&driver).await?;
        self.store.put_ride(&ride).await?;

        tracing::info!(
            "Ride {} completed by {}: fare {}, payout {}, platform {}",
            ride.id,
            ride.driver_id,
            format_rupees(ride.fare.total),
            format_rupees(ride.driver_payout),
            format_rupees(ride.platform_share)
        );

        Ok(ride.into())
    }

    async fn rate_ride(&self, ride_id: &str, rating: u8) -> RidelineResult<RideResponse> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::validation_error("rating", "Rating must be 1-5"));
        }

        let mut ride = self
            .store
            .get_ride(ride_id)
            .await?
            .ok_or_else(|| AppError::RideNotFound(ride_id.to_string()))?;

        if ride.rating.is_some() {
            return Err(AppError::Conflict(format!("Ride {} is already rated", ride_id)));
        }

        let mut driver = self
            .store
            .get_driver(&ride.driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(&ride.driver_id))?;

        ride.rating = Some(rating);
        driver.stats.rating_sum += rating as u32;
        driver.stats.rating_count += 1;
        driver.updated_at = self.clock.now();

        self.store.put_driver(&driver).await?;
        self.store.put_ride(&ride).await?;

        Ok(ride.into())
    }

    async fn get_ride(&self, ride_id: &str) -> RidelineResult<RideResponse> {
        let ride = self
            .store
            .get_ride(ride_id)
            .await?
            .ok_or_else(|| AppError::RideNotFound(ride_id.to_string()))?;
        Ok(ride.into())
    }

    async fn rides_for_driver(&self, driver_id: &str) -> RidelineResult<Vec<RideResponse>> {
        let mut rides: Vec<Ride> = self
            .store
            .list_rides()
            .await?
            .into_iter()
            .filter(|r| r.driver_id == driver_id)
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides.into_iter().map(Into::into).collect())
    }
}
