// src/services/assignment.rs
use async_trait::async_trait;
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::{
        audit::{AuditAction, AuditRecord},
        driver::{CompensationModel, LifecycleStatus},
        vehicle::{
            AssignmentState, ConditionState, Ownership, Vehicle, VehicleRegistration,
            VehicleResponse,
        },
    },
    storage::DocumentStore,
    utils::clock::SharedClock,
    utils::id_generator::{IdGenerator, IdType},
};

#[async_trait]
pub trait AssignmentOperations: Send + Sync {
    async fn register_vehicle(
        &self,
        registration: VehicleRegistration,
    ) -> RidelineResult<VehicleResponse>;
    async fn get_vehicle(&self, vehicle_id: &str) -> RidelineResult<VehicleResponse>;
    async fn list_vehicles(&self) -> RidelineResult<Vec<VehicleResponse>>;
    async fn set_condition(
        &self,
        vehicle_id: &str,
        condition: ConditionState,
    ) -> RidelineResult<VehicleResponse>;
    async fn assign(
        &self,
        vehicle_id: &str,
        driver_id: &str,
        actor: &str,
    ) -> RidelineResult<VehicleResponse>;
    async fn unassign(&self, vehicle_id: &str, actor: &str) -> RidelineResult<VehicleResponse>;
}

/// Maintains the exclusive vehicle↔driver binding. Both sides of the
/// relation are committed in one atomic batch so the bidirectional
/// invariant is never observable half-applied. Re-assignment is always
/// unassign-then-assign, never a direct transfer.
pub struct AssignmentService {
    store: DocumentStore,
    clock: SharedClock,
}

impl AssignmentService {
    pub fn new(store: DocumentStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Defensive invariant sweep over the whole collection: every assigned
    /// vehicle must be pointed back at by its driver, and vice versa.
    /// Exercised by tests; unreachable violations surface as
    /// `ConsistencyViolation`.
    pub async fn check_consistency(&self) -> RidelineResult<()> {
        let vehicles = self.store.list_vehicles().await?;
        let drivers = self.store.list_drivers().await?;

        for vehicle in &vehicles {
            match (&vehicle.assignment_state, &vehicle.assigned_driver_id) {
                (AssignmentState::Assigned, Some(driver_id)) => {
                    let driver = drivers.iter().find(|d| &d.id == driver_id).ok_or_else(|| {
                        AppError::ConsistencyViolation(format!(
                            "vehicle {} references missing driver {}",
                            vehicle.id, driver_id
                        ))
                    })?;
                    if driver.compensation_model.assigned_vehicle_id() != Some(vehicle.id.as_str())
                    {
                        return Err(AppError::ConsistencyViolation(format!(
                            "vehicle {} -> driver {} back-reference missing",
                            vehicle.id, driver_id
                        )));
                    }
                }
                (AssignmentState::Assigned, None) | (AssignmentState::Available, Some(_)) => {
                    return Err(AppError::ConsistencyViolation(format!(
                        "vehicle {} assignment state and driver reference disagree",
                        vehicle.id
                    )));
                }
                (AssignmentState::Available, None) => {}
            }
        }

        for driver in &drivers {
            if let Some(vehicle_id) = driver.compensation_model.assigned_vehicle_id() {
                let vehicle = vehicles.iter().find(|v| v.id == vehicle_id).ok_or_else(|| {
                    AppError::ConsistencyViolation(format!(
                        "driver {} references missing vehicle {}",
                        driver.id, vehicle_id
                    ))
                })?;
                if vehicle.assigned_driver_id.as_deref() != Some(driver.id.as_str()) {
                    return Err(AppError::ConsistencyViolation(format!(
                        "driver {} -> vehicle {} back-reference missing",
                        driver.id, vehicle_id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl AssignmentOperations for AssignmentService {
    async fn register_vehicle(
        &self,
        registration: VehicleRegistration,
    ) -> RidelineResult<VehicleResponse> {
        if registration.registration_number.trim().is_empty() {
            return Err(AppError::MissingRequiredField(
                "registration_number".to_string(),
            ));
        }

        let existing = self.store.list_vehicles().await?;
        if existing
            .iter()
            .any(|v| v.registration_number == registration.registration_number)
        {
            return Err(AppError::duplicate(
                "registration_number",
                registration.registration_number,
            ));
        }

        let now = self.clock.now();
        let vehicle = Vehicle {
            id: IdGenerator::generate(IdType::Vehicle),
            registration_number: registration.registration_number,
            ownership: registration.ownership,
            assignment_state: AssignmentState::Available,
            condition_state: ConditionState::Operational,
            assigned_driver_id: None,
            compliance: registration.compliance,
            created_at: now,
            updated_at: now,
        };

        self.store.put_vehicle(&vehicle).await?;
        tracing::info!("Vehicle registered: {}", vehicle.id);

        Ok(VehicleResponse::from_vehicle(vehicle, now))
    }

    async fn get_vehicle(&self, vehicle_id: &str) -> RidelineResult<VehicleResponse> {
        let vehicle = self
            .store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| AppError::vehicle_not_found(vehicle_id))?;
        Ok(VehicleResponse::from_vehicle(vehicle, self.clock.now()))
    }

    async fn list_vehicles(&self) -> RidelineResult<Vec<VehicleResponse>> {
        let now = self.clock.now();
        let vehicles = self.store.list_vehicles().await?;
        Ok(vehicles
            .into_iter()
            .map(|v| VehicleResponse::from_vehicle(v, now))
            .collect())
    }

    async fn set_condition(
        &self,
        vehicle_id: &str,
        condition: ConditionState,
    ) -> RidelineResult<VehicleResponse> {
        let mut vehicle = self
            .store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| AppError::vehicle_not_found(vehicle_id))?;

        vehicle.condition_state = condition;
        vehicle.updated_at = self.clock.now();
        self.store.put_vehicle(&vehicle).await?;

        tracing::info!("Vehicle {} condition set to {:?}", vehicle_id, condition);

        Ok(VehicleResponse::from_vehicle(vehicle, self.clock.now()))
    }

    async fn assign(
        &self,
        vehicle_id: &str,
        driver_id: &str,
        actor: &str,
    ) -> RidelineResult<VehicleResponse> {
        let mut vehicle = self
            .store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| AppError::vehicle_not_found(vehicle_id))?;
        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        if vehicle.ownership != Ownership::Company {
            return Err(AppError::VehicleUnavailable(format!(
                "{} is driver-owned and outside the assignable pool",
                vehicle_id
            )));
        }
        if vehicle.assignment_state != AssignmentState::Available {
            return Err(AppError::VehicleUnavailable(format!(
                "{} is already assigned",
                vehicle_id
            )));
        }
        if vehicle.condition_state != ConditionState::Operational {
            return Err(AppError::VehicleUnavailable(format!(
                "{} is not operational ({:?})",
                vehicle_id, vehicle.condition_state
            )));
        }

        if driver.lifecycle_status != LifecycleStatus::Active {
            return Err(AppError::DriverNotEligible(format!(
                "{} has lifecycle status {}",
                driver_id,
                driver.lifecycle_status.as_str()
            )));
        }

        match &mut driver.compensation_model {
            CompensationModel::Owner { .. } => {
                return Err(AppError::DriverNotEligible(format!(
                    "{} is an owner driver",
                    driver_id
                )));
            }
            CompensationModel::Fleet { assigned_vehicle_id, .. } => {
                if let Some(held) = assigned_vehicle_id {
                    return Err(AppError::DriverNotEligible(format!(
                        "{} already holds vehicle {}",
                        driver_id, held
                    )));
                }
                *assigned_vehicle_id = Some(vehicle.id.clone());
            }
        }

        let now = self.clock.now();
        vehicle.assignment_state = AssignmentState::Assigned;
        vehicle.assigned_driver_id = Some(driver.id.clone());
        vehicle.updated_at = now;
        driver.updated_at = now;

        // Both sides and the audit record, or nothing: one atomic batch
        let audit = AuditRecord::new(
            actor,
            AuditAction::VehicleAssigned,
            vehicle_id,
            now,
            format!("assigned to driver {}", driver_id),
        );
        self.store.commit_assignment(&driver, &vehicle, &audit).await?;

        tracing::info!("Vehicle {} assigned to driver {}", vehicle_id, driver_id);

        Ok(VehicleResponse::from_vehicle(vehicle, now))
    }

    async fn unassign(&self, vehicle_id: &str, actor: &str) -> RidelineResult<VehicleResponse> {
        let mut vehicle = self
            .store
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| AppError::vehicle_not_found(vehicle_id))?;

        if vehicle.assignment_state != AssignmentState::Assigned {
            return Err(AppError::VehicleNotAssigned(vehicle_id.to_string()));
        }

        let driver_id = vehicle.assigned_driver_id.clone().ok_or_else(|| {
            AppError::ConsistencyViolation(format!(
                "vehicle {} assigned with no driver reference",
                vehicle_id
            ))
        })?;

        let mut driver = self.store.get_driver(&driver_id).await?.ok_or_else(|| {
            AppError::ConsistencyViolation(format!(
                "vehicle {} references missing driver {}",
                vehicle_id, driver_id
            ))
        })?;

        match &mut driver.compensation_model {
            CompensationModel::Fleet { assigned_vehicle_id, .. } => {
                if assigned_vehicle_id.as_deref() != Some(vehicle_id) {
                    return Err(AppError::ConsistencyViolation(format!(
                        "driver {} does not point back at vehicle {}",
                        driver_id, vehicle_id
                    )));
                }
                *assigned_vehicle_id = None;
            }
            CompensationModel::Owner { .. } => {
                return Err(AppError::ConsistencyViolation(format!(
                    "owner driver {} recorded as assignee of {}",
                    driver_id, vehicle_id
                )));
            }
        }

        let now = self.clock.now();
        // Condition is an independent axis; a vehicle in maintenance stays
        // in maintenance through unassignment.
        vehicle.assignment_state = AssignmentState::Available;
        vehicle.assigned_driver_id = None;
        vehicle.updated_at = now;
        driver.updated_at = now;

        let audit = AuditRecord::new(
            actor,
            AuditAction::VehicleUnassigned,
            vehicle_id,
            now,
            format!("unassigned from driver {}", driver_id),
        );
        self.store.commit_assignment(&driver, &vehicle, &audit).await?;

        tracing::info!("Vehicle {} unassigned from driver {}", vehicle_id, driver_id);

        Ok(VehicleResponse::from_vehicle(vehicle, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::{Driver, DriverStats};
    use crate::models::vehicle::ComplianceDates;
    use crate::storage::memory::MemoryBackend;
    use crate::storage::{DocumentWrite, StoreBackend};
    use crate::utils::clock::FixedClock;
    use crate::utils::money::rupees;
    use std::sync::Arc;

    /// Delegates everything to an in-memory store but refuses batch writes,
    /// standing in for a broken MULTI/EXEC pipeline.
    struct BatchRefusingBackend {
        inner: MemoryBackend,
    }

    #[async_trait]
    impl StoreBackend for BatchRefusingBackend {
        async fn get(&self, key: &str) -> RidelineResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, value: String) -> RidelineResult<()> {
            self.inner.put(key, value).await
        }

        async fn delete(&self, key: &str) -> RidelineResult<()> {
            self.inner.delete(key).await
        }

        async fn scan(&self, prefix: &str) -> RidelineResult<Vec<String>> {
            self.inner.scan(prefix).await
        }

        async fn put_many(&self, _writes: Vec<DocumentWrite>) -> RidelineResult<()> {
            Err(AppError::StoreQuery("batch refused".to_string()))
        }
    }

    fn fleet_driver(id: &str) -> Driver {
        Driver {
            id: id.to_string(),
            name: "Ravi".to_string(),
            email: format!("{}@example.com", id),
            phone: format!("98{}", id.len()),
            license_number: format!("DL-{}", id),
            compensation_model: CompensationModel::Fleet {
                salary_per_km: rupees(10),
                assigned_vehicle_id: None,
                current_shift: None,
                shift_history: vec![],
            },
            lifecycle_status: LifecycleStatus::Active,
            is_online: false,
            documents_verified: true,
            approved_at: None,
            stats: DriverStats::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn company_vehicle(id: &str) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            registration_number: format!("KA-01-{}", id),
            ownership: Ownership::Company,
            assignment_state: AssignmentState::Available,
            condition_state: ConditionState::Operational,
            assigned_driver_id: None,
            compliance: ComplianceDates::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    async fn setup() -> (AssignmentService, DocumentStore) {
        let store = DocumentStore::new(Arc::new(MemoryBackend::new()));
        let service = AssignmentService::new(store.clone(), Arc::new(FixedClock::at_hour(10)));
        (service, store)
    }

    #[tokio::test]
    async fn test_assign_sets_both_sides() {
        let (service, store) = setup().await;
        store.put_driver(&fleet_driver("drv-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-aaaaa")).await.unwrap();

        let response = service
            .assign("veh-250615-aaaaa", "drv-250615-aaaaa", "admin")
            .await
            .unwrap();
        assert_eq!(response.assignment_state, AssignmentState::Assigned);
        assert_eq!(response.assigned_driver_id.as_deref(), Some("drv-250615-aaaaa"));

        let driver = store.get_driver("drv-250615-aaaaa").await.unwrap().unwrap();
        assert_eq!(
            driver.compensation_model.assigned_vehicle_id(),
            Some("veh-250615-aaaaa")
        );

        service.check_consistency().await.unwrap();

        let audit = store.list_audit().await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, AuditAction::VehicleAssigned);
    }

    #[tokio::test]
    async fn test_assign_guards() {
        let (service, store) = setup().await;

        let mut owned = company_vehicle("veh-250615-owned");
        owned.ownership = Ownership::DriverOwned;
        store.put_vehicle(&owned).await.unwrap();

        let mut broken = company_vehicle("veh-250615-maint");
        broken.condition_state = ConditionState::Maintenance;
        store.put_vehicle(&broken).await.unwrap();

        store.put_vehicle(&company_vehicle("veh-250615-good")).await.unwrap();

        let mut pending = fleet_driver("drv-250615-pend1");
        pending.lifecycle_status = LifecycleStatus::Pending;
        store.put_driver(&pending).await.unwrap();

        let mut owner = fleet_driver("drv-250615-owner");
        owner.compensation_model = CompensationModel::Owner {
            commission_rate: 0.1,
            vehicle_number: "KA-02-XY-1000".to_string(),
        };
        store.put_driver(&owner).await.unwrap();

        store.put_driver(&fleet_driver("drv-250615-good1")).await.unwrap();

        let err = service
            .assign("veh-250615-owned", "drv-250615-good1", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VehicleUnavailable(_)));

        let err = service
            .assign("veh-250615-maint", "drv-250615-good1", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VehicleUnavailable(_)));

        let err = service
            .assign("veh-250615-good", "drv-250615-pend1", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DriverNotEligible(_)));

        let err = service
            .assign("veh-250615-good", "drv-250615-owner", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DriverNotEligible(_)));

        // None of the failed attempts may have left partial state
        service.check_consistency().await.unwrap();
    }

    #[tokio::test]
    async fn test_one_vehicle_per_driver() {
        let (service, store) = setup().await;
        store.put_driver(&fleet_driver("drv-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-bbbbb")).await.unwrap();

        service
            .assign("veh-250615-aaaaa", "drv-250615-aaaaa", "admin")
            .await
            .unwrap();
        let err = service
            .assign("veh-250615-bbbbb", "drv-250615-aaaaa", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DriverNotEligible(_)));
    }

    #[tokio::test]
    async fn test_unassign_round_trip() {
        let (service, store) = setup().await;
        store.put_driver(&fleet_driver("drv-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-aaaaa")).await.unwrap();

        service
            .assign("veh-250615-aaaaa", "drv-250615-aaaaa", "admin")
            .await
            .unwrap();
        let response = service.unassign("veh-250615-aaaaa", "admin").await.unwrap();

        assert_eq!(response.assignment_state, AssignmentState::Available);
        assert_eq!(response.assigned_driver_id, None);

        let driver = store.get_driver("drv-250615-aaaaa").await.unwrap().unwrap();
        assert_eq!(driver.compensation_model.assigned_vehicle_id(), None);

        service.check_consistency().await.unwrap();

        let err = service.unassign("veh-250615-aaaaa", "admin").await.unwrap_err();
        assert!(matches!(err, AppError::VehicleNotAssigned(_)));
    }

    #[tokio::test]
    async fn test_maintenance_survives_unassignment() {
        let (service, store) = setup().await;
        store.put_driver(&fleet_driver("drv-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-aaaaa")).await.unwrap();

        service
            .assign("veh-250615-aaaaa", "drv-250615-aaaaa", "admin")
            .await
            .unwrap();
        service
            .set_condition("veh-250615-aaaaa", ConditionState::Maintenance)
            .await
            .unwrap();

        let response = service.unassign("veh-250615-aaaaa", "admin").await.unwrap();
        assert_eq!(response.assignment_state, AssignmentState::Available);
        assert_eq!(response.condition_state, ConditionState::Maintenance);
    }

    #[tokio::test]
    async fn test_consistency_after_operation_sequences() {
        let (service, store) = setup().await;
        for i in 0..3 {
            store
                .put_driver(&fleet_driver(&format!("drv-250615-d{:04}", i)))
                .await
                .unwrap();
            store
                .put_vehicle(&company_vehicle(&format!("veh-250615-v{:04}", i)))
                .await
                .unwrap();
        }

        // Arbitrary interleaving of assigns, failed assigns and unassigns;
        // the invariant must hold after every step, not just at rest.
        let steps: Vec<(&str, &str, bool)> = vec![
            ("veh-250615-v0000", "drv-250615-d0000", true),
            ("veh-250615-v0001", "drv-250615-d0000", false), // driver taken
            ("veh-250615-v0000", "drv-250615-d0001", false), // vehicle taken
            ("veh-250615-v0001", "drv-250615-d0001", true),
            ("veh-250615-v0002", "drv-250615-d0002", true),
        ];

        for (vehicle_id, driver_id, should_succeed) in steps {
            let result = service.assign(vehicle_id, driver_id, "admin").await;
            assert_eq!(result.is_ok(), should_succeed);
            service.check_consistency().await.unwrap();
        }

        service.unassign("veh-250615-v0001", "admin").await.unwrap();
        service.check_consistency().await.unwrap();

        // Re-assignment is unassign-then-assign
        service
            .assign("veh-250615-v0001", "drv-250615-d0001", "admin")
            .await
            .unwrap();
        service.check_consistency().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_no_partial_state_or_audit() {
        let store = DocumentStore::new(Arc::new(BatchRefusingBackend {
            inner: MemoryBackend::new(),
        }));
        let service = AssignmentService::new(store.clone(), Arc::new(FixedClock::at_hour(10)));

        store.put_driver(&fleet_driver("drv-250615-aaaaa")).await.unwrap();
        store.put_vehicle(&company_vehicle("veh-250615-aaaaa")).await.unwrap();

        let err = service
            .assign("veh-250615-aaaaa", "drv-250615-aaaaa", "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PersistenceError(_)));

        // Nothing committed: both documents unchanged, no stray audit record
        let driver = store.get_driver("drv-250615-aaaaa").await.unwrap().unwrap();
        assert_eq!(driver.compensation_model.assigned_vehicle_id(), None);
        let vehicle = store.get_vehicle("veh-250615-aaaaa").await.unwrap().unwrap();
        assert_eq!(vehicle.assignment_state, AssignmentState::Available);
        assert!(store.list_audit().await.unwrap().is_empty());

        service.check_consistency().await.unwrap();
    }

    #[tokio::test]
    async fn test_register_vehicle_rejects_duplicates() {
        let (service, _) = setup().await;
        service
            .register_vehicle(VehicleRegistration {
                registration_number: "KA-09-ZZ-1234".to_string(),
                ownership: Ownership::Company,
                compliance: ComplianceDates::default(),
            })
            .await
            .unwrap();

        let err = service
            .register_vehicle(VehicleRegistration {
                registration_number: "KA-09-ZZ-1234".to_string(),
                ownership: Ownership::Company,
                compliance: ComplianceDates::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateField { .. }));
    }
}
