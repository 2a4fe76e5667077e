// src/models/driver.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::money::Paise;

/// Commission cap for owner drivers (30%).
pub const MAX_COMMISSION_RATE: f64 = 0.30;
/// Per-km salary band for fleet drivers, in paise (₹5 – ₹50 per km).
pub const MIN_SALARY_PER_KM: Paise = 500;
pub const MAX_SALARY_PER_KM: Paise = 5_000;
/// Shift distance target used when the driver does not supply one.
pub const DEFAULT_SHIFT_TARGET_KM: f64 = 100.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Pending,   // Signup submitted, awaiting admin review
    Active,    // Approved, may go online and take rides
    Suspended, // Admin suspension, reversible
    Inactive,  // Rejected application, terminal
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStatus::Pending => "pending",
            LifecycleStatus::Active => "active",
            LifecycleStatus::Suspended => "suspended",
            LifecycleStatus::Inactive => "inactive",
        }
    }
}

/// A fleet driver's bounded work session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shift {
    pub started_at: DateTime<Utc>,
    pub target_km: f64,
    pub completed_km: f64, // raw, may exceed target
    pub is_active: bool,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Shift {
    /// Target progress clamped to [0, 1] for any presentation layer.
    pub fn progress(&self) -> f64 {
        if self.target_km <= 0.0 {
            return 0.0;
        }
        (self.completed_km / self.target_km).clamp(0.0, 1.0)
    }
}

/// How a driver is paid. The variant is fixed at onboarding; changing it
/// requires re-onboarding. Assignment and shift state live inside the
/// `Fleet` variant, so an owner driver can never hold either.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompensationModel {
    Owner {
        /// Platform commission on each fare, 0 ≤ r ≤ 0.30.
        commission_rate: f64,
        /// The owner's own vehicle, tracked outside the assignment relation.
        vehicle_number: String,
    },
    Fleet {
        /// Guaranteed pay per km, in paise (₹5 – ₹50).
        salary_per_km: Paise,
        assigned_vehicle_id: Option<String>,
        current_shift: Option<Shift>,
        shift_history: Vec<Shift>,
    },
}

impl CompensationModel {
    pub fn kind(&self) -> &'static str {
        match self {
            CompensationModel::Owner { .. } => "owner",
            CompensationModel::Fleet { .. } => "fleet",
        }
    }

    pub fn is_fleet(&self) -> bool {
        matches!(self, CompensationModel::Fleet { .. })
    }

    pub fn assigned_vehicle_id(&self) -> Option<&str> {
        match self {
            CompensationModel::Fleet { assigned_vehicle_id, .. } => {
                assigned_vehicle_id.as_deref()
            }
            CompensationModel::Owner { .. } => None,
        }
    }

    pub fn current_shift(&self) -> Option<&Shift> {
        match self {
            CompensationModel::Fleet { current_shift, .. } => current_shift.as_ref(),
            CompensationModel::Owner { .. } => None,
        }
    }
}

/// Cumulative driver stats. All fields are monotonically non-decreasing;
/// earnings accumulate in integer paise so they never drift.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DriverStats {
    pub total_rides: u32,
    pub total_earnings: Paise,
    pub total_km_driven: f64,
    pub online_hours: f64,
    pub rating_sum: u32,
    pub rating_count: u32,
    pub rides_accepted: u32,
    pub rides_offered: u32,
}

impl DriverStats {
    /// Average rating is recomputed from the running sum, never stored.
    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            return 0.0;
        }
        self.rating_sum as f64 / self.rating_count as f64
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.rides_offered == 0 {
            return 0.0;
        }
        self.rides_accepted as f64 / self.rides_offered as f64
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub email: String,          // unique
    pub phone: String,          // unique
    pub license_number: String, // unique
    pub compensation_model: CompensationModel,
    pub lifecycle_status: LifecycleStatus,
    pub is_online: bool,
    pub documents_verified: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub stats: DriverStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request/Response models

/// Signup submission. The compensation model is chosen once, here.
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverSignup {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub compensation: CompensationChoice,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompensationChoice {
    Owner {
        commission_rate: f64,
        vehicle_number: String,
    },
    Fleet {
        /// Rupees per km; converted to paise at creation.
        salary_per_km_rupees: i64,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DriverResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub compensation_kind: String,
    pub lifecycle_status: LifecycleStatus,
    pub is_online: bool,
    pub assigned_vehicle_id: Option<String>,
    pub current_shift: Option<Shift>,
    pub total_rides: u32,
    pub total_earnings: Paise,
    pub total_km_driven: f64,
    pub online_hours: f64,
    pub average_rating: f64,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        DriverResponse {
            id: driver.id.clone(),
            name: driver.name,
            phone: driver.phone,
            compensation_kind: driver.compensation_model.kind().to_string(),
            lifecycle_status: driver.lifecycle_status,
            is_online: driver.is_online,
            assigned_vehicle_id: driver
                .compensation_model
                .assigned_vehicle_id()
                .map(str::to_string),
            current_shift: driver.compensation_model.current_shift().cloned(),
            total_rides: driver.stats.total_rides,
            total_earnings: driver.stats.total_earnings,
            total_km_driven: driver.stats.total_km_driven,
            online_hours: driver.stats.online_hours,
            average_rating: driver.stats.average_rating(),
        }
    }
}
