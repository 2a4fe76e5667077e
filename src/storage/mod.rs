// src/storage/mod.rs
//
// The core consumes persistence through this small CRUD contract only.
// Backends: redis (JSON documents, MULTI/EXEC batch) for production and an
// in-memory map for tests and local development.
pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::{audit::AuditRecord, driver::Driver, ride::Ride, vehicle::Vehicle},
};

/// One document write inside a batch.
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub key: String,
    pub value: String,
}

/// Key-value contract every backend implements.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    async fn get(&self, key: &str) -> RidelineResult<Option<String>>;
    async fn put(&self, key: &str, value: String) -> RidelineResult<()>;
    async fn delete(&self, key: &str) -> RidelineResult<()>;
    /// All values whose key starts with the prefix.
    async fn scan(&self, prefix: &str) -> RidelineResult<Vec<String>>;
    /// Atomic multi-document write: all writes commit or none do. The
    /// assignment manager's paired update depends on this guarantee.
    async fn put_many(&self, writes: Vec<DocumentWrite>) -> RidelineResult<()>;
}

/// Key layout for the document namespace.
pub struct StoreKeys;

impl StoreKeys {
    pub fn driver(id: &str) -> String {
        format!("driver:{}", id)
    }

    pub fn vehicle(id: &str) -> String {
        format!("vehicle:{}", id)
    }

    pub fn ride(id: &str) -> String {
        format!("ride:{}", id)
    }

    pub fn audit(id: &str) -> String {
        format!("audit:{}", id)
    }

    pub const DRIVER_PREFIX: &'static str = "driver:";
    pub const VEHICLE_PREFIX: &'static str = "vehicle:";
    pub const RIDE_PREFIX: &'static str = "ride:";
    pub const AUDIT_PREFIX: &'static str = "audit:";
}

/// Typed document store over a pluggable backend.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StoreBackend>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    fn encode<T: Serialize>(value: &T) -> RidelineResult<String> {
        serde_json::to_string(value).map_err(AppError::from)
    }

    fn decode<T: DeserializeOwned>(raw: &str) -> RidelineResult<T> {
        serde_json::from_str(raw).map_err(AppError::from)
    }

    async fn get_typed<T: DeserializeOwned>(&self, key: &str) -> RidelineResult<Option<T>> {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(Self::decode(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_typed<T: DeserializeOwned>(&self, prefix: &str) -> RidelineResult<Vec<T>> {
        let raws = self.backend.scan(prefix).await?;
        raws.iter().map(|raw| Self::decode(raw)).collect()
    }

    // Drivers

    pub async fn get_driver(&self, id: &str) -> RidelineResult<Option<Driver>> {
        self.get_typed(&StoreKeys::driver(id)).await
    }

    pub async fn put_driver(&self, driver: &Driver) -> RidelineResult<()> {
        self.backend
            .put(&StoreKeys::driver(&driver.id), Self::encode(driver)?)
            .await
    }

    pub async fn list_drivers(&self) -> RidelineResult<Vec<Driver>> {
        self.list_typed(StoreKeys::DRIVER_PREFIX).await
    }

    // Vehicles

    pub async fn get_vehicle(&self, id: &str) -> RidelineResult<Option<Vehicle>> {
        self.get_typed(&StoreKeys::vehicle(id)).await
    }

    pub async fn put_vehicle(&self, vehicle: &Vehicle) -> RidelineResult<()> {
        self.backend
            .put(&StoreKeys::vehicle(&vehicle.id), Self::encode(vehicle)?)
            .await
    }

    pub async fn list_vehicles(&self) -> RidelineResult<Vec<Vehicle>> {
        self.list_typed(StoreKeys::VEHICLE_PREFIX).await
    }

    /// Commit both sides of an assignment change plus its audit record as
    /// one atomic batch, so the bidirectional invariant is never observable
    /// half-applied and the trail never disagrees with the data. A failure
    /// here surfaces as `PersistenceError` with nothing written.
    pub async fn commit_assignment(
        &self,
        driver: &Driver,
        vehicle: &Vehicle,
        audit: &AuditRecord,
    ) -> RidelineResult<()> {
        let writes = vec![
            DocumentWrite {
                key: StoreKeys::driver(&driver.id),
                value: Self::encode(driver)?,
            },
            DocumentWrite {
                key: StoreKeys::vehicle(&vehicle.id),
                value: Self::encode(vehicle)?,
            },
            DocumentWrite {
                key: StoreKeys::audit(&audit.id),
                value: Self::encode(audit)?,
            },
        ];

        self.backend
            .put_many(writes)
            .await
            .map_err(|e| AppError::PersistenceError(e.to_string()))
    }

    /// Commit a driver change together with its audit record, atomically.
    pub async fn put_driver_with_audit(
        &self,
        driver: &Driver,
        audit: &AuditRecord,
    ) -> RidelineResult<()> {
        let writes = vec![
            DocumentWrite {
                key: StoreKeys::driver(&driver.id),
                value: Self::encode(driver)?,
            },
            DocumentWrite {
                key: StoreKeys::audit(&audit.id),
                value: Self::encode(audit)?,
            },
        ];

        self.backend
            .put_many(writes)
            .await
            .map_err(|e| AppError::PersistenceError(e.to_string()))
    }

    // Rides (append-only ledger once completed)

    pub async fn get_ride(&self, id: &str) -> RidelineResult<Option<Ride>> {
        self.get_typed(&StoreKeys::ride(id)).await
    }

    pub async fn put_ride(&self, ride: &Ride) -> RidelineResult<()> {
        self.backend
            .put(&StoreKeys::ride(&ride.id), Self::encode(ride)?)
            .await
    }

    pub async fn list_rides(&self) -> RidelineResult<Vec<Ride>> {
        self.list_typed(StoreKeys::RIDE_PREFIX).await
    }

    // Audit trail (append-only; records are written inside the batches above)

    pub async fn list_audit(&self) -> RidelineResult<Vec<AuditRecord>> {
        let mut records: Vec<AuditRecord> = self.list_typed(StoreKeys::AUDIT_PREFIX).await?;
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }
}
