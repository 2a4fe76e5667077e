// src/handlers/mod.rs
pub mod driver_handler;
pub mod report_handler;
pub mod ride_handler;
pub mod vehicle_handler;
