// src/models/vehicle.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Days before expiry at which insurance/pollution certificates are flagged.
pub const NEAR_EXPIRY_DAYS_INSURANCE: i64 = 30;
pub const NEAR_EXPIRY_DAYS_POLLUTION: i64 = 30;
/// Registration gets a longer warning window.
pub const NEAR_EXPIRY_DAYS_REGISTRATION: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Company,     // Fleet vehicle, assignable by the admin
    DriverOwned, // Bound to its owner at onboarding, never in the assignable pool
}

/// Whether the vehicle is bound to a fleet driver. Independent of condition.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Available,
    Assigned,
}

/// Physical/serviceability state, tracked separately from assignment so a
/// vehicle can sit in maintenance without losing its assignment history.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionState {
    Operational,
    Maintenance,
    OutOfService,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ComplianceDates {
    pub last_service: Option<DateTime<Utc>>,
    pub next_service: Option<DateTime<Utc>>,
    pub insurance_expiry: Option<DateTime<Utc>>,
    pub registration_expiry: Option<DateTime<Utc>>,
    pub pollution_expiry: Option<DateTime<Utc>>,
}

/// Derived compliance warnings. Never persisted; recomputed on read.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ComplianceWarnings {
    pub insurance_near_expiry: bool,
    pub registration_near_expiry: bool,
    pub pollution_near_expiry: bool,
}

impl ComplianceDates {
    pub fn warnings_at(&self, now: DateTime<Utc>) -> ComplianceWarnings {
        fn near(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>, days: i64) -> bool {
            match expiry {
                Some(at) => at <= now + Duration::days(days),
                None => false,
            }
        }

        ComplianceWarnings {
            insurance_near_expiry: near(self.insurance_expiry, now, NEAR_EXPIRY_DAYS_INSURANCE),
            registration_near_expiry: near(
                self.registration_expiry,
                now,
                NEAR_EXPIRY_DAYS_REGISTRATION,
            ),
            pollution_near_expiry: near(self.pollution_expiry, now, NEAR_EXPIRY_DAYS_POLLUTION),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub registration_number: String, // unique
    pub ownership: Ownership,
    pub assignment_state: AssignmentState,
    pub condition_state: ConditionState,
    /// Present iff assignment_state = Assigned.
    pub assigned_driver_id: Option<String>,
    pub compliance: ComplianceDates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// A company vehicle in operational condition with no current binding.
    pub fn is_assignable(&self) -> bool {
        self.ownership == Ownership::Company
            && self.assignment_state == AssignmentState::Available
            && self.condition_state == ConditionState::Operational
    }
}

// Request/Response models

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleRegistration {
    pub registration_number: String,
    pub ownership: Ownership,
    #[serde(default)]
    pub compliance: ComplianceDates,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub id: String,
    pub registration_number: String,
    pub ownership: Ownership,
    pub assignment_state: AssignmentState,
    pub condition_state: ConditionState,
    pub assigned_driver_id: Option<String>,
    pub compliance: ComplianceDates,
    pub warnings: ComplianceWarnings,
}

impl VehicleResponse {
    pub fn from_vehicle(vehicle: Vehicle, now: DateTime<Utc>) -> Self {
        let warnings = vehicle.compliance.warnings_at(now);
        VehicleResponse {
            id: vehicle.id,
            registration_number: vehicle.registration_number,
            ownership: vehicle.ownership,
            assignment_state: vehicle.assignment_state,
            condition_state: vehicle.condition_state,
            assigned_driver_id: vehicle.assigned_driver_id,
            compliance: vehicle.compliance,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_vehicle() -> Vehicle {
        Vehicle {
            id: "veh-250615-aaaaa".to_string(),
            registration_number: "KA-01-HH-1234".to_string(),
            ownership: Ownership::Company,
            assignment_state: AssignmentState::Available,
            condition_state: ConditionState::Operational,
            assigned_driver_id: None,
            compliance: ComplianceDates::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assignable_pool_excludes_driver_owned() {
        let mut vehicle = base_vehicle();
        assert!(vehicle.is_assignable());

        vehicle.ownership = Ownership::DriverOwned;
        assert!(!vehicle.is_assignable());
    }

    #[test]
    fn test_maintenance_blocks_assignment() {
        let mut vehicle = base_vehicle();
        vehicle.condition_state = ConditionState::Maintenance;
        assert!(!vehicle.is_assignable());
    }

    #[test]
    fn test_near_expiry_windows() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let compliance = ComplianceDates {
            insurance_expiry: Some(now + Duration::days(29)),
            registration_expiry: Some(now + Duration::days(61)),
            pollution_expiry: Some(now + Duration::days(31)),
            ..Default::default()
        };

        let warnings = compliance.warnings_at(now);
        assert!(warnings.insurance_near_expiry); // within 30 days
        assert!(!warnings.registration_near_expiry); // outside 60 days
        assert!(!warnings.pollution_near_expiry); // outside 30 days
    }
}
