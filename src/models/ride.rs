// src/models/ride.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::money::Paise;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Economy,
    Premium,
    Suv,
    Luxury,
}

impl VehicleClass {
    pub fn fare_multiplier(&self) -> f64 {
        match self {
            VehicleClass::Economy => 1.0,
            VehicleClass::Premium => 1.5,
            VehicleClass::Suv => 2.0,
            VehicleClass::Luxury => 3.3,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TripPurpose {
    General,
    Emergency,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Requested,
    Accepted,
    EnRoute,
    Completed, // terminal; the ride record is immutable once here
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Itemized fare. Amounts are paise; surcharge fields carry the amount each
/// step added on top of the running subtotal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FareBreakdown {
    pub distance_km: f64,
    pub base_fare: Paise,
    pub class_surcharge: Paise,
    pub night_surcharge: Paise,
    pub emergency_surcharge: Paise,
    pub total: Paise,
    pub estimated_duration_min: i32,
    pub currency: String,
}

/// Ledger record for a ride. Append-only once status = Completed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ride {
    pub id: String,
    pub driver_id: String,
    pub vehicle_class: VehicleClass,
    pub purpose: TripPurpose,
    pub status: RideStatus,
    pub fare: FareBreakdown,
    pub driver_payout: Paise,
    pub platform_share: Paise, // may be negative for fleet drivers
    pub rating: Option<u8>,    // 1-5, set once by the rider
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Request/Response models

#[derive(Debug, Serialize, Deserialize)]
pub struct FareEstimateRequest {
    /// Either explicit coordinates or a precomputed road distance.
    pub pickup: Option<Coordinates>,
    pub destination: Option<Coordinates>,
    pub distance_km: Option<f64>,
    pub vehicle_class: VehicleClass,
    pub purpose: TripPurpose,
}

/// Completion event for a ride a driver has carried out. This is the core's
/// primary external input; the preceding request/accept/en-route flow is
/// driven elsewhere.
#[derive(Debug, Serialize, Deserialize)]
pub struct RideCompletion {
    pub driver_id: String,
    pub vehicle_class: VehicleClass,
    pub purpose: TripPurpose,
    pub distance_km: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RideResponse {
    pub id: String,
    pub driver_id: String,
    pub status: RideStatus,
    pub fare: FareBreakdown,
    pub driver_payout: Paise,
    pub platform_share: Paise,
    pub rating: Option<u8>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        RideResponse {
            id: ride.id,
            driver_id: ride.driver_id,
            status: ride.status,
            fare: ride.fare,
            driver_payout: ride.driver_payout,
            platform_share: ride.platform_share,
            rating: ride.rating,
            completed_at: ride.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_multipliers() {
        assert_eq!(VehicleClass::Economy.fare_multiplier(), 1.0);
        assert_eq!(VehicleClass::Premium.fare_multiplier(), 1.5);
        assert_eq!(VehicleClass::Suv.fare_multiplier(), 2.0);
        assert_eq!(VehicleClass::Luxury.fare_multiplier(), 3.3);
    }
}
