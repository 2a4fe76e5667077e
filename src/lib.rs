// src/lib.rs
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use errors::{RidelineError, RidelineResult, ValidationError};
