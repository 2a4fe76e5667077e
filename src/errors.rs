use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the rideline core
#[derive(Debug)]
pub enum RidelineError {
    // HTTP and API errors
    Conflict(String),

    // Document store errors
    StoreConnection(String),
    StoreQuery(String),
    StoreSerialization(String),
    // An atomic batch write was rejected; nothing in the batch landed.
    PersistenceError(String),

    // Validation errors (caught before any mutation)
    ValidationFailed(Vec<ValidationError>),
    MissingRequiredField(String),
    InvalidCompensationModel(String),

    // State machine errors
    InvalidTransition { from: String, action: String },
    ShiftAlreadyActive(String),
    NoActiveShift(String),

    // Business-rule eligibility errors
    NotFleetDriver(String),
    NotEligible(String),
    DriverNotEligible(String),
    VehicleUnavailable(String),
    VehicleNotAssigned(String),

    // Referenced entity absent
    DriverNotFound(String),
    VehicleNotFound(String),
    RideNotFound(String),

    // Duplicate unique field (email, phone, license, registration number)
    DuplicateField { field: String, value: String },

    // The two-sided assignment invariant would be broken. Unreachable in a
    // correct implementation; checked as a defensive safeguard.
    ConsistencyViolation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl fmt::Display for RidelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RidelineError::Conflict(msg) => write!(f, "Conflict: {}", msg),

            RidelineError::StoreConnection(msg) => write!(f, "Store connection error: {}", msg),
            RidelineError::StoreQuery(msg) => write!(f, "Store query error: {}", msg),
            RidelineError::StoreSerialization(msg) => {
                write!(f, "Store serialization error: {}", msg)
            }
            RidelineError::PersistenceError(msg) => {
                write!(f, "Persistence error during paired write: {}", msg)
            }

            RidelineError::ValidationFailed(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            RidelineError::MissingRequiredField(field) => {
                write!(f, "Missing required field: {}", field)
            }
            RidelineError::InvalidCompensationModel(msg) => {
                write!(f, "Invalid compensation model: {}", msg)
            }

            RidelineError::InvalidTransition { from, action } => {
                write!(f, "Illegal lifecycle transition: {} from status {}", action, from)
            }
            RidelineError::ShiftAlreadyActive(id) => {
                write!(f, "Driver {} already has an active shift", id)
            }
            RidelineError::NoActiveShift(id) => write!(f, "Driver {} has no active shift", id),

            RidelineError::NotFleetDriver(id) => {
                write!(f, "Driver {} is not a fleet driver", id)
            }
            RidelineError::NotEligible(msg) => write!(f, "Not eligible: {}", msg),
            RidelineError::DriverNotEligible(msg) => {
                write!(f, "Driver not eligible for assignment: {}", msg)
            }
            RidelineError::VehicleUnavailable(msg) => {
                write!(f, "Vehicle unavailable for assignment: {}", msg)
            }
            RidelineError::VehicleNotAssigned(id) => {
                write!(f, "Vehicle {} is not currently assigned", id)
            }

            RidelineError::DriverNotFound(id) => write!(f, "Driver not found: {}", id),
            RidelineError::VehicleNotFound(id) => write!(f, "Vehicle not found: {}", id),
            RidelineError::RideNotFound(id) => write!(f, "Ride not found: {}", id),

            RidelineError::DuplicateField { field, value } => {
                write!(f, "Duplicate {}: {}", field, value)
            }

            RidelineError::ConsistencyViolation(msg) => {
                write!(f, "Assignment consistency violation: {}", msg)
            }
        }
    }
}

impl std::error::Error for RidelineError {}

impl IntoResponse for RidelineError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            RidelineError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),

            RidelineError::ValidationFailed(errors) => {
                let details = serde_json::to_value(&errors).ok();
                (
                    StatusCode::BAD_REQUEST,
                    "validation_failed",
                    "Validation errors occurred".to_string(),
                    details,
                )
            }
            RidelineError::MissingRequiredField(field) => (
                StatusCode::BAD_REQUEST,
                "missing_field",
                format!("Missing required field: {}", field),
                None,
            ),
            RidelineError::InvalidCompensationModel(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_compensation_model",
                msg,
                None,
            ),

            RidelineError::InvalidTransition { ref from, ref action } => (
                StatusCode::CONFLICT,
                "invalid_transition",
                format!("Cannot {} a driver with status {}", action, from),
                None,
            ),
            RidelineError::ShiftAlreadyActive(id) => (
                StatusCode::CONFLICT,
                "shift_already_active",
                format!("Driver {} already has an active shift", id),
                None,
            ),
            RidelineError::NoActiveShift(id) => (
                StatusCode::CONFLICT,
                "no_active_shift",
                format!("Driver {} has no active shift", id),
                None,
            ),

            RidelineError::NotFleetDriver(id) => (
                StatusCode::CONFLICT,
                "not_fleet_driver",
                format!("Driver {} is not a fleet driver", id),
                None,
            ),
            RidelineError::NotEligible(msg) => (StatusCode::CONFLICT, "not_eligible", msg, None),
            RidelineError::DriverNotEligible(msg) => {
                (StatusCode::CONFLICT, "driver_not_eligible", msg, None)
            }
            RidelineError::VehicleUnavailable(msg) => {
                (StatusCode::CONFLICT, "vehicle_unavailable", msg, None)
            }
            RidelineError::VehicleNotAssigned(id) => (
                StatusCode::CONFLICT,
                "vehicle_not_assigned",
                format!("Vehicle {} is not currently assigned", id),
                None,
            ),
            RidelineError::DriverNotFound(id) => (
                StatusCode::NOT_FOUND,
                "driver_not_found",
                format!("Driver not found: {}", id),
                None,
            ),
            RidelineError::VehicleNotFound(id) => (
                StatusCode::NOT_FOUND,
                "vehicle_not_found",
                format!("Vehicle not found: {}", id),
                None,
            ),
            RidelineError::RideNotFound(id) => (
                StatusCode::NOT_FOUND,
                "ride_not_found",
                format!("Ride not found: {}", id),
                None,
            ),

            RidelineError::DuplicateField { field, value } => (
                StatusCode::CONFLICT,
                "duplicate_field",
                format!("Duplicate {}: {}", field, value),
                None,
            ),

            RidelineError::PersistenceError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                msg,
                None,
            ),

            // All other errors are treated as internal server errors
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
                None,
            ),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, axum::Json(error_response)).into_response()
    }
}

// Convenience type alias for Results
pub type RidelineResult<T> = Result<T, RidelineError>;

// Conversion implementations for common error types
impl From<redis::RedisError> for RidelineError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => RidelineError::StoreConnection(err.to_string()),
            redis::ErrorKind::ResponseError => RidelineError::StoreQuery(err.to_string()),
            redis::ErrorKind::AuthenticationFailed => {
                RidelineError::StoreConnection("Authentication failed".to_string())
            }
            _ => RidelineError::StoreQuery(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RidelineError {
    fn from(err: serde_json::Error) -> Self {
        RidelineError::StoreSerialization(err.to_string())
    }
}

// Helper functions for creating common errors
impl RidelineError {
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        RidelineError::ValidationFailed(vec![ValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn invalid_transition(from: impl Into<String>, action: impl Into<String>) -> Self {
        RidelineError::InvalidTransition {
            from: from.into(),
            action: action.into(),
        }
    }

    pub fn driver_not_found(driver_id: impl Into<String>) -> Self {
        RidelineError::DriverNotFound(driver_id.into())
    }

    pub fn vehicle_not_found(vehicle_id: impl Into<String>) -> Self {
        RidelineError::VehicleNotFound(vehicle_id.into())
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        RidelineError::DuplicateField {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = RidelineError::DriverNotFound("drv-250615-abc12".to_string());
        assert_eq!(error.to_string(), "Driver not found: drv-250615-abc12");
    }

    #[test]
    fn test_validation_error() {
        let error = RidelineError::validation_error("email", "Invalid email format");
        match error {
            RidelineError::ValidationFailed(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
                assert_eq!(errors[0].message, "Invalid email format");
            }
            _ => panic!("Expected ValidationFailed error"),
        }
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = RidelineError::invalid_transition("pending", "suspend");
        assert_eq!(
            error.to_string(),
            "Illegal lifecycle transition: suspend from status pending"
        );
    }

    #[test]
    fn test_helper_functions() {
        assert!(matches!(
            RidelineError::driver_not_found("drv-250615-abc12"),
            RidelineError::DriverNotFound(_)
        ));
        assert!(matches!(
            RidelineError::duplicate("phone", "0241234567"),
            RidelineError::DuplicateField { .. }
        ));
    }
}
