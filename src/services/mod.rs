// src/services/mod.rs
pub mod assignment;
pub mod compensation;
pub mod driver_service;
pub mod fare;
pub mod lifecycle;
pub mod reports;
pub mod ride_service;
pub mod shift;

pub use assignment::{AssignmentOperations, AssignmentService};
pub use compensation::{CompensationSplit, CompensationSplitter};
pub use driver_service::{DriverOperations, DriverService};
pub use fare::FareCalculator;
pub use lifecycle::{LifecycleOperations, LifecycleService};
pub use reports::{MarketplaceReport, ReportOperations, ReportService, TopEarner};
pub use ride_service::{RideOperations, RideService};
pub use shift::{ShiftOperations, ShiftService};
