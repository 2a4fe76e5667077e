// src/services/compensation.rs
use serde::{Deserialize, Serialize};

use crate::{
    errors::{RidelineError as AppError, RidelineResult},
    models::driver::{
        CompensationModel, MAX_COMMISSION_RATE, MAX_SALARY_PER_KM, MIN_SALARY_PER_KM,
    },
    utils::money::{Paise, round_rupees_half_up, PAISE_PER_RUPEE},
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CompensationSplit {
    pub driver_payout: Paise,
    /// May be negative for fleet drivers: the per-km salary floor can exceed
    /// the realized fare. That is a business outcome, not an error.
    pub platform_share: Paise,
}

/// Splits a completed ride's fare between platform and driver.
///
/// The splitter assumes the model's bounds were validated at driver creation
/// (`validate_model`), so it never rejects a well-formed driver record.
pub struct CompensationSplitter;

impl CompensationSplitter {
    pub fn split(fare: Paise, distance_km: f64, model: &CompensationModel) -> CompensationSplit {
        match model {
            CompensationModel::Owner { commission_rate, .. } => {
                let fare_rupees = fare as f64 / PAISE_PER_RUPEE as f64;
                let driver_payout = round_rupees_half_up(fare_rupees * (1.0 - commission_rate));
                // Platform share is the remainder, never computed
                // independently, so the two sides sum to the fare exactly.
                CompensationSplit {
                    driver_payout,
                    platform_share: fare - driver_payout,
                }
            }
            CompensationModel::Fleet { salary_per_km, .. } => {
                let salary_rupees = *salary_per_km as f64 / PAISE_PER_RUPEE as f64;
                let driver_payout = round_rupees_half_up(distance_km * salary_rupees);
                CompensationSplit {
                    driver_payout,
                    platform_share: fare - driver_payout,
                }
            }
        }
    }

    /// Bounds check applied once, at driver creation. The variant itself is
    /// immutable afterwards.
    pub fn validate_model(model: &CompensationModel) -> RidelineResult<()> {
        match model {
            CompensationModel::Owner { commission_rate, .. } => {
                if !(0.0..=MAX_COMMISSION_RATE).contains(commission_rate) {
                    return Err(AppError::InvalidCompensationModel(format!(
                        "commission_rate {} outside [0, {}]",
                        commission_rate, MAX_COMMISSION_RATE
                    )));
                }
            }
            CompensationModel::Fleet { salary_per_km, .. } => {
                if !(MIN_SALARY_PER_KM..=MAX_SALARY_PER_KM).contains(salary_per_km) {
                    return Err(AppError::InvalidCompensationModel(format!(
                        "salary_per_km {} paise outside [{}, {}]",
                        salary_per_km, MIN_SALARY_PER_KM, MAX_SALARY_PER_KM
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::money::rupees;

    fn owner(rate: f64) -> CompensationModel {
        CompensationModel::Owner {
            commission_rate: rate,
            vehicle_number: "KA-05-MH-9999".to_string(),
        }
    }

    fn fleet(salary_per_km: Paise) -> CompensationModel {
        CompensationModel::Fleet {
            salary_per_km,
            assigned_vehicle_id: None,
            current_shift: None,
            shift_history: vec![],
        }
    }

    #[test]
    fn test_owner_split_sums_exactly() {
        for fare in [0, rupees(75), rupees(141), rupees(999), 12_345_00] {
            for rate in [0.0, 0.1, 0.25, 0.30] {
                let split = CompensationSplitter::split(fare, 5.0, &owner(rate));
                assert_eq!(split.driver_payout + split.platform_share, fare);
                assert!(split.driver_payout >= 0);
            }
        }
    }

    #[test]
    fn test_owner_commission_taken_from_fare() {
        // ₹100 fare at 20% commission: driver ₹80, platform ₹20
        let split = CompensationSplitter::split(rupees(100), 8.0, &owner(0.2));
        assert_eq!(split.driver_payout, rupees(80));
        assert_eq!(split.platform_share, rupees(20));
    }

    #[test]
    fn test_fleet_payout_independent_of_fare() {
        // 10 km at ₹12/km: payout ₹120 whatever the fare collected
        let model = fleet(rupees(12));
        for fare in [0, rupees(75), rupees(500)] {
            let split = CompensationSplitter::split(fare, 10.0, &model);
            assert_eq!(split.driver_payout, rupees(120));
            assert_eq!(split.platform_share, fare - rupees(120));
        }
    }

    #[test]
    fn test_fleet_platform_share_may_be_negative() {
        // Fare ₹75, salary floor 10 km × ₹12 = ₹120: platform eats −₹45
        let split = CompensationSplitter::split(rupees(75), 10.0, &fleet(rupees(12)));
        assert_eq!(split.driver_payout, rupees(120));
        assert_eq!(split.platform_share, rupees(-45));
        assert!(split.driver_payout >= 0);
    }

    #[test]
    fn test_zero_distance_fleet_payout() {
        let split = CompensationSplitter::split(rupees(30), 0.0, &fleet(rupees(12)));
        assert_eq!(split.driver_payout, 0);
        assert_eq!(split.platform_share, rupees(30));
    }

    #[test]
    fn test_model_bounds() {
        assert!(CompensationSplitter::validate_model(&owner(0.0)).is_ok());
        assert!(CompensationSplitter::validate_model(&owner(0.30)).is_ok());
        assert!(CompensationSplitter::validate_model(&owner(0.31)).is_err());
        assert!(CompensationSplitter::validate_model(&owner(-0.01)).is_err());

        assert!(CompensationSplitter::validate_model(&fleet(rupees(5))).is_ok());
        assert!(CompensationSplitter::validate_model(&fleet(rupees(50))).is_ok());
        assert!(CompensationSplitter::validate_model(&fleet(rupees(4))).is_err());
        assert!(CompensationSplitter::validate_model(&fleet(rupees(51))).is_err());
    }
}
