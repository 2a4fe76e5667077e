// src/models/audit.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::id_generator::{IdGenerator, IdType};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    DriverApproved,
    DriverRejected,
    DriverSuspended,
    DriverReactivated,
    VehicleAssigned,
    VehicleUnassigned,
}

/// Append-only record of an administrative action. This trail is the
/// system's only durable history of admin activity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: String,
    pub actor: String,
    pub action: AuditAction,
    pub target_id: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl AuditRecord {
    pub fn new(
        actor: impl Into<String>,
        action: AuditAction,
        target_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: IdGenerator::generate(IdType::Audit),
            actor: actor.into(),
            action,
            target_id: target_id.into(),
            timestamp,
            details: details.into(),
        }
    }
}
