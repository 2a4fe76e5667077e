// src/services/lifecycle.rs
use async_trait::async_trait;
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::{
        audit::{AuditAction, AuditRecord},
        driver::{Driver, DriverResponse, LifecycleStatus},
    },
    storage::DocumentStore,
    utils::clock::SharedClock,
};

#[async_trait]
pub trait LifecycleOperations: Send + Sync {
    async fn approve(&self, driver_id: &str, actor: &str) -> RidelineResult<DriverResponse>;
    async fn reject(
        &self,
        driver_id: &str,
        actor: &str,
        reason: &str,
    ) -> RidelineResult<DriverResponse>;
    async fn suspend(
        &self,
        driver_id: &str,
        actor: &str,
        reason: &str,
    ) -> RidelineResult<DriverResponse>;
    async fn reactivate(&self, driver_id: &str, actor: &str) -> RidelineResult<DriverResponse>;
    async fn audit_trail(&self) -> RidelineResult<Vec<AuditRecord>>;
}

/// Driver lifecycle state machine:
/// pending → active ⇄ suspended, pending → inactive (terminal).
/// Every transition appends an audit record; that trail is the only durable
/// history of administrative actions.
pub struct LifecycleService {
    store: DocumentStore,
    clock: SharedClock,
}

impl LifecycleService {
    pub fn new(store: DocumentStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    async fn load(&self, driver_id: &str) -> RidelineResult<Driver> {
        self.store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))
    }

    fn require_status(
        driver: &Driver,
        expected: LifecycleStatus,
        action: &str,
    ) -> RidelineResult<()> {
        if driver.lifecycle_status != expected {
            return Err(AppError::invalid_transition(
                driver.lifecycle_status.as_str(),
                action,
            ));
        }
        Ok(())
    }

    async fn commit(
        &self,
        mut driver: Driver,
        actor: &str,
        action: AuditAction,
        details: String,
    ) -> RidelineResult<DriverResponse> {
        let now = self.clock.now();
        driver.updated_at = now;

        // Status change and its audit record land together or not at all
        let record = AuditRecord::new(actor, action, &driver.id, now, details);
        self.store.put_driver_with_audit(&driver, &record).await?;

        Ok(driver.into())
    }
}

#[async_trait]
impl LifecycleOperations for LifecycleService {
    async fn approve(&self, driver_id: &str, actor: &str) -> RidelineResult<DriverResponse> {
        let mut driver = self.load(driver_id).await?;
        Self::require_status(&driver, LifecycleStatus::Pending, "approve")?;

        driver.lifecycle_status = LifecycleStatus::Active;
        driver.documents_verified = true;
        driver.approved_at = Some(self.clock.now());

        tracing::info!("Driver {} approved by {}", driver_id, actor);

        self.commit(driver, actor, AuditAction::DriverApproved, String::new())
            .await
    }

    async fn reject(
        &self,
        driver_id: &str,
        actor: &str,
        reason: &str,
    ) -> RidelineResult<DriverResponse> {
        let mut driver = self.load(driver_id).await?;
        Self::require_status(&driver, LifecycleStatus::Pending, "reject")?;

        // Terminal for this application; the unique email/phone/license
        // stay reserved by the stored record.
        driver.lifecycle_status = LifecycleStatus::Inactive;

        tracing::info!("Driver {} rejected by {}: {}", driver_id, actor, reason);

        self.commit(
            driver,
            actor,
            AuditAction::DriverRejected,
            reason.to_string(),
        )
        .await
    }

    async fn suspend(
        &self,
        driver_id: &str,
        actor: &str,
        reason: &str,
    ) -> RidelineResult<DriverResponse> {
        let mut driver = self.load(driver_id).await?;
        Self::require_status(&driver, LifecycleStatus::Active, "suspend")?;

        driver.lifecycle_status = LifecycleStatus::Suspended;
        // A suspended driver cannot stay online, whatever their prior state
        driver.is_online = false;

        tracing::warn!("Driver {} suspended by {}: {}", driver_id, actor, reason);

        self.commit(
            driver,
            actor,
            AuditAction::DriverSuspended,
            reason.to_string(),
        )
        .await
    }

    async fn reactivate(&self, driver_id: &str, actor: &str) -> RidelineResult<DriverResponse> {
        let mut driver = self.load(driver_id).await?;
        Self::require_status(&driver, LifecycleStatus::Suspended, "reactivate")?;

        driver.lifecycle_status = LifecycleStatus::Active;

        tracing::info!("Driver {} reactivated by {}", driver_id, actor);

        self.commit(driver, actor, AuditAction::DriverReactivated, String::new())
            .await
    }

    async fn audit_trail(&self) -> RidelineResult<Vec<AuditRecord>> {
        self.store.list_audit().await
    }
}
