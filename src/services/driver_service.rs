// src/services/driver_service.rs
use async_trait::async_trait;
use tracing;

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::driver::{
        CompensationChoice, CompensationModel, Driver, DriverResponse, DriverSignup, DriverStats,
        LifecycleStatus,
    },
    services::compensation::CompensationSplitter,
    storage::DocumentStore,
    utils::clock::SharedClock,
    utils::id_generator::{IdGenerator, IdType},
    utils::money::rupees,
};

#[async_trait]
pub trait DriverOperations: Send + Sync {
    async fn register_driver(&self, signup: DriverSignup) -> RidelineResult<DriverResponse>;
    async fn get_driver(&self, driver_id: &str) -> RidelineResult<DriverResponse>;
    async fn list_drivers(&self) -> RidelineResult<Vec<DriverResponse>>;
    async fn set_online(&self, driver_id: &str, online: bool) -> RidelineResult<DriverResponse>;
}

/// Driver onboarding and presence. The compensation model is chosen at
/// signup, bounds-checked here once, and never changes afterwards.
pub struct DriverService {
    store: DocumentStore,
    clock: SharedClock,
}

impl DriverService {
    pub fn new(store: DocumentStore, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    fn build_model(choice: CompensationChoice) -> CompensationModel {
        match choice {
            CompensationChoice::Owner { commission_rate, vehicle_number } => {
                CompensationModel::Owner { commission_rate, vehicle_number }
            }
            CompensationChoice::Fleet { salary_per_km_rupees } => CompensationModel::Fleet {
                salary_per_km: rupees(salary_per_km_rupees),
                assigned_vehicle_id: None,
                current_shift: None,
                shift_history: vec![],
            },
        }
    }

    async fn check_unique(
        &self,
        email: &str,
        phone: &str,
        license_number: &str,
    ) -> RidelineResult<()> {
        let drivers = self.store.list_drivers().await?;
        for driver in &drivers {
            if driver.email == email {
                return Err(AppError::duplicate("email", email));
            }
            if driver.phone == phone {
                return Err(AppError::duplicate("phone", phone));
            }
            if driver.license_number == license_number {
                return Err(AppError::duplicate("license_number", license_number));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DriverOperations for DriverService {
    async fn register_driver(&self, signup: DriverSignup) -> RidelineResult<DriverResponse> {
        let DriverSignup { name, email, phone, license_number, compensation } = signup;

        for (field, value) in [
            ("name", &name),
            ("email", &email),
            ("phone", &phone),
            ("license_number", &license_number),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::MissingRequiredField(field.to_string()));
            }
        }

        let model = Self::build_model(compensation);
        // Bounds are enforced here, once; the splitter can assume a stored
        // driver record is always well-formed.
        CompensationSplitter::validate_model(&model)?;

        self.check_unique(&email, &phone, &license_number).await?;

        let now = self.clock.now();
        let driver = Driver {
            id: IdGenerator::generate(IdType::Driver),
            name,
            email,
            phone,
            license_number,
            compensation_model: model,
            lifecycle_status: LifecycleStatus::Pending,
            is_online: false,
            documents_verified: false,
            approved_at: None,
            stats: DriverStats::default(),
            created_at: now,
            updated_at: now,
        };

        self.store.put_driver(&driver).await?;

        tracing::info!(
            "Driver registered: {} ({} model), pending review",
            driver.id,
            driver.compensation_model.kind()
        );

        Ok(driver.into())
    }

    async fn get_driver(&self, driver_id: &str) -> RidelineResult<DriverResponse> {
        let driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;
        Ok(driver.into())
    }

    async fn list_drivers(&self) -> RidelineResult<Vec<DriverResponse>> {
        let drivers = self.store.list_drivers().await?;
        Ok(drivers.into_iter().map(Into::into).collect())
    }

    async fn set_online(&self, driver_id: &str, online: bool) -> RidelineResult<DriverResponse> {
        let mut driver = self
            .store
            .get_driver(driver_id)
            .await?
            .ok_or_else(|| AppError::driver_not_found(driver_id))?;

        if online && driver.lifecycle_status != LifecycleStatus::Active {
            return Err(AppError::NotEligible(format!(
                "driver {} cannot go online with status {}",
                driver_id,
                driver.lifecycle_status.as_str()
            )));
        }

        driver.is_online = online;
        driver.updated_at = self.clock.now();
        self.store.put_driver(&driver).await?;

        tracing::debug!("Driver {} is now {}", driver_id, if online { "online" } else { "offline" });

        Ok(driver.into())
    }
}
