// src/services/fare.rs
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::ride::{Coordinates, FareBreakdown, FareEstimateRequest, TripPurpose, VehicleClass},
    utils::clock::SharedClock,
    utils::money::{format_rupees, round_rupees_half_up},
};

/// Minimum fare in rupees, covering the first `MINIMUM_FARE_KM` flat.
pub const MINIMUM_FARE_RUPEES: f64 = 30.0;
pub const MINIMUM_FARE_KM: f64 = 2.0;
/// Per-km rate in rupees beyond the minimum-fare distance.
pub const PER_KM_RATE_RUPEES: f64 = 15.0;
/// Night window is [22:00, 05:00) local, surcharge ×1.25.
pub const NIGHT_MULTIPLIER: f64 = 1.25;
/// Emergency trips surcharge ×1.5.
pub const EMERGENCY_MULTIPLIER: f64 = 1.5;
/// Straight-line estimates are scaled by this fixed road-distance correction
/// instead of a live routing call.
pub const ROAD_CORRECTION_FACTOR: f64 = 1.3;
/// Average urban speed used for duration estimates, km/h.
pub const AVERAGE_SPEED_KMH: f64 = 30.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Pure fare computation. Deterministic given inputs and the injected
/// clock's hour; tests pass the hour explicitly through `quote`.
pub struct FareCalculator {
    clock: SharedClock,
}

impl FareCalculator {
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    pub fn estimate(&self, request: &FareEstimateRequest) -> RidelineResult<FareBreakdown> {
        let distance_km = self.resolve_distance(request)?;
        let breakdown = Self::quote(
            distance_km,
            request.vehicle_class,
            request.purpose,
            self.clock.local_hour(),
        );

        tracing::debug!(
            "Fare estimate: {:.2} km, {:?}, {:?} -> {}",
            distance_km,
            request.vehicle_class,
            request.purpose,
            format_rupees(breakdown.total)
        );

        Ok(breakdown)
    }

    fn resolve_distance(&self, request: &FareEstimateRequest) -> RidelineResult<f64> {
        let distance_km = match (request.distance_km, request.pickup, request.destination) {
            (Some(km), _, _) => km,
            (None, Some(pickup), Some(destination)) => Self::road_distance_km(pickup, destination),
            _ => {
                return Err(AppError::MissingRequiredField(
                    "distance_km or pickup+destination".to_string(),
                ))
            }
        };

        if distance_km < 0.0 || !distance_km.is_finite() {
            return Err(AppError::validation_error(
                "distance_km",
                "Distance must be a non-negative number",
            ));
        }

        Ok(distance_km)
    }

    /// Straight-line haversine distance scaled by the road correction factor.
    pub fn road_distance_km(from: Coordinates, to: Coordinates) -> f64 {
        let lat1_rad = from.latitude.to_radians();
        let lat2_rad = to.latitude.to_radians();
        let delta_lat = (to.latitude - from.latitude).to_radians();
        let delta_lon = (to.longitude - from.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c * ROAD_CORRECTION_FACTOR
    }

    /// Compute the full fare breakdown for a trip at the given local hour.
    ///
    /// Multiplier order is fixed: base -> class -> night -> emergency, then
    /// one round-half-up to the whole rupee on the total. Each breakdown
    /// line is the difference of consecutive rounded running totals, so the
    /// lines sum to the total exactly and a multiplier that was not applied
    /// itemizes as zero.
    pub fn quote(
        distance_km: f64,
        vehicle_class: VehicleClass,
        purpose: TripPurpose,
        local_hour: u32,
    ) -> FareBreakdown {
        let base = if distance_km <= MINIMUM_FARE_KM {
            MINIMUM_FARE_RUPEES
        } else {
            MINIMUM_FARE_RUPEES + (distance_km - MINIMUM_FARE_KM) * PER_KM_RATE_RUPEES
        };

        let after_class = base * vehicle_class.fare_multiplier();

        let night_multiplier = if Self::is_night(local_hour) {
            NIGHT_MULTIPLIER
        } else {
            1.0
        };
        let after_night = after_class * night_multiplier;

        let emergency_multiplier = match purpose {
            TripPurpose::Emergency => EMERGENCY_MULTIPLIER,
            TripPurpose::General => 1.0,
        };
        let after_emergency = after_night * emergency_multiplier;

        let base_fare = round_rupees_half_up(base);
        let rounded_after_class = round_rupees_half_up(after_class);
        let rounded_after_night = round_rupees_half_up(after_night);
        let total = round_rupees_half_up(after_emergency);

        let class_surcharge = rounded_after_class - base_fare;
        let night_surcharge = rounded_after_night - rounded_after_class;
        let emergency_surcharge = total - rounded_after_night;

        FareBreakdown {
            distance_km,
            base_fare,
            class_surcharge,
            night_surcharge,
            emergency_surcharge,
            total,
            estimated_duration_min: Self::estimated_duration_min(distance_km),
            currency: "INR".to_string(),
        }
    }

    pub fn is_night(local_hour: u32) -> bool {
        local_hour >= 22 || local_hour < 5
    }

    pub fn estimated_duration_min(distance_km: f64) -> i32 {
        ((distance_km / AVERAGE_SPEED_KMH) * 60.0) as i32
    }
}
