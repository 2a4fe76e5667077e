// src/services/reports.rs
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    errors::RidelineResult,
    models::{
        driver::Driver,
        ride::{Ride, RideStatus},
        vehicle::Vehicle,
    },
    storage::DocumentStore,
    utils::money::Paise,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketplaceReport {
    pub drivers_by_status: BTreeMap<String, u32>,
    pub drivers_by_compensation: BTreeMap<String, u32>,
    pub drivers_online: u32,
    pub vehicles_by_assignment: BTreeMap<String, u32>,
    pub vehicles_by_condition: BTreeMap<String, u32>,
    pub total_rides: u64,
    pub total_revenue: Paise,
    pub total_platform_share: Paise,
    pub total_km: f64,
    pub average_rating: f64,
    pub acceptance_rate: f64,
    pub completion_rate: f64,
    pub top_earners: Vec<TopEarner>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TopEarner {
    pub driver_id: String,
    pub name: String,
    pub total_earnings: Paise,
    pub total_rides: u32,
}

#[async_trait]
pub trait ReportOperations: Send + Sync {
    async fn marketplace_report(&self, top_n: usize) -> RidelineResult<MarketplaceReport>;
}

/// Read-only aggregation over the current store contents. Everything is a
/// single fold; ratios come back as 0 when their denominator is empty.
pub struct ReportService {
    store: DocumentStore,
}

impl ReportService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub fn build_report(
        drivers: &[Driver],
        vehicles: &[Vehicle],
        rides: &[Ride],
        top_n: usize,
    ) -> MarketplaceReport {
        let mut drivers_by_status = BTreeMap::new();
        let mut drivers_by_compensation = BTreeMap::new();
        let mut drivers_online = 0u32;
        let mut rating_sum = 0u64;
        let mut rating_count = 0u64;
        let mut rides_accepted = 0u64;
        let mut rides_offered = 0u64;

        for driver in drivers {
            *drivers_by_status
                .entry(driver.lifecycle_status.as_str().to_string())
                .or_insert(0) += 1;
            *drivers_by_compensation
                .entry(driver.compensation_model.kind().to_string())
                .or_insert(0) += 1;
            if driver.is_online {
                drivers_online += 1;
            }
            rating_sum += driver.stats.rating_sum as u64;
            rating_count += driver.stats.rating_count as u64;
            rides_accepted += driver.stats.rides_accepted as u64;
            rides_offered += driver.stats.rides_offered as u64;
        }

        let mut vehicles_by_assignment = BTreeMap::new();
        let mut vehicles_by_condition = BTreeMap::new();
        for vehicle in vehicles {
            let assignment = match vehicle.assignment_state {
                crate::models::vehicle::AssignmentState::Available => "available",
                crate::models::vehicle::AssignmentState::Assigned => "assigned",
            };
            let condition = match vehicle.condition_state {
                crate::models::vehicle::ConditionState::Operational => "operational",
                crate::models::vehicle::ConditionState::Maintenance => "maintenance",
                crate::models::vehicle::ConditionState::OutOfService => "out_of_service",
            };
            *vehicles_by_assignment.entry(assignment.to_string()).or_insert(0) += 1;
            *vehicles_by_condition.entry(condition.to_string()).or_insert(0) += 1;
        }

        let mut total_revenue: Paise = 0;
        let mut total_platform_share: Paise = 0;
        let mut total_km = 0.0;
        let mut completed = 0u64;
        for ride in rides {
            total_revenue += ride.fare.total;
            total_platform_share += ride.platform_share;
            total_km += ride.fare.distance_km;
            if ride.status == RideStatus::Completed {
                completed += 1;
            }
        }

        let mut earners: Vec<&Driver> = drivers.iter().collect();
        earners.sort_by(|a, b| {
            b.stats
                .total_earnings
                .cmp(&a.stats.total_earnings)
                .then_with(|| a.id.cmp(&b.id))
        });
        let top_earners = earners
            .into_iter()
            .take(top_n)
            .map(|d| TopEarner {
                driver_id: d.id.clone(),
                name: d.name.clone(),
                total_earnings: d.stats.total_earnings,
                total_rides: d.stats.total_rides,
            })
            .collect();

        MarketplaceReport {
            drivers_by_status,
            drivers_by_compensation,
            drivers_online,
            vehicles_by_assignment,
            vehicles_by_condition,
            total_rides: rides.len() as u64,
            total_revenue,
            total_platform_share,
            total_km,
            average_rating: ratio(rating_sum as f64, rating_count as f64),
            acceptance_rate: ratio(rides_accepted as f64, rides_offered as f64),
            completion_rate: ratio(completed as f64, rides.len() as f64),
            top_earners,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

#[async_trait]
impl ReportOperations for ReportService {
    async fn marketplace_report(&self, top_n: usize) -> RidelineResult<MarketplaceReport> {
        let drivers = self.store.list_drivers().await?;
        let vehicles = self.store.list_vehicles().await?;
        let rides = self.store.list_rides().await?;
        Ok(Self::build_report(&drivers, &vehicles, &rides, top_n))
    }
}
