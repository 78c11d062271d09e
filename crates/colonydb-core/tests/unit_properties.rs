//! Property tests for unit normalization and the dosing formulas.

use chrono::NaiveDate;
use colonydb_core::dosing::{concentration, target_dose, weight_at};
use colonydb_core::models::{AnimalWeight, TreatmentPlan};
use colonydb_core::units::{from_base, to_base, DoseUnit, VolumeUnit, WeightUnit};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Stored-precision magnitudes: up to 4 integer digits and 3 places.
fn stored_magnitude() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|raw| Decimal::new(raw, 3))
}

fn weight_unit() -> impl Strategy<Value = WeightUnit> {
    prop_oneof![
        Just(WeightUnit::Kilogram),
        Just(WeightUnit::Gram),
        Just(WeightUnit::Milligram),
    ]
}

fn dose_unit() -> impl Strategy<Value = DoseUnit> {
    prop_oneof![
        Just(DoseUnit::Milligram),
        Just(DoseUnit::Microgram),
        Just(DoseUnit::Nanogram),
        Just(DoseUnit::Picogram),
    ]
}

fn volume_unit() -> impl Strategy<Value = VolumeUnit> {
    prop_oneof![Just(VolumeUnit::Milliliter), Just(VolumeUnit::Microliter)]
}

fn plan(dose: Decimal, volume: Decimal, expected_grams: Decimal) -> TreatmentPlan {
    TreatmentPlan {
        id: None,
        treatment: "Vehicle".into(),
        expected_animal_weight: expected_grams,
        expected_animal_weight_units: WeightUnit::Gram,
        volume,
        volume_units: VolumeUnit::Milliliter,
        dose,
        dose_units: DoseUnit::Milligram,
    }
}

proptest! {
    #[test]
    fn base_round_trip(value in stored_magnitude(), exponent in -9i32..=3) {
        let base = to_base(value, exponent).unwrap();
        prop_assert_eq!(from_base(base, exponent).unwrap(), value);
    }

    #[test]
    fn weight_units_scale_by_thousands(value in stored_magnitude()) {
        let kg = to_base(value, WeightUnit::Kilogram.into()).unwrap();
        let g = to_base(value, WeightUnit::Gram.into()).unwrap();
        let mg = to_base(value, WeightUnit::Milligram.into()).unwrap();
        prop_assert_eq!(kg, g * Decimal::ONE_THOUSAND);
        prop_assert_eq!(g, mg * Decimal::ONE_THOUSAND);
    }

    #[test]
    fn concentration_per_one_ml_equals_dose(dose in stored_magnitude()) {
        let plan = plan(dose, Decimal::ONE, Decimal::new(30, 0));
        prop_assert_eq!(concentration(&plan).unwrap(), dose);
    }

    #[test]
    fn target_dose_for_one_kg_equals_dose(dose in stored_magnitude()) {
        let plan = plan(dose, Decimal::ONE, Decimal::ONE_THOUSAND);
        prop_assert_eq!(target_dose(&plan).unwrap(), dose);
    }

    #[test]
    fn concentration_scales_with_dose(dose in 1i64..10_000, volume in stored_magnitude()) {
        let single = concentration(&plan(Decimal::from(dose), volume, Decimal::ONE)).unwrap();
        let double = concentration(&plan(Decimal::from(dose * 2), volume, Decimal::ONE)).unwrap();
        let drift = (double - single * Decimal::TWO).abs();
        prop_assert!(drift <= Decimal::new(1, 12));
    }

    #[test]
    fn doubling_volume_halves_concentration(
        dose in stored_magnitude(),
        volume in stored_magnitude(),
    ) {
        let single = concentration(&plan(dose, volume, Decimal::ONE)).unwrap();
        let double = concentration(&plan(dose, volume * Decimal::TWO, Decimal::ONE)).unwrap();
        let drift = (double * Decimal::TWO - single).abs();
        prop_assert!(drift <= Decimal::new(1, 12));
    }

    #[test]
    fn target_dose_matches_concentration_identity(
        dose in stored_magnitude(),
        dose_unit in dose_unit(),
        volume in stored_magnitude(),
        volume_unit in volume_unit(),
        expected in stored_magnitude(),
        expected_unit in weight_unit(),
    ) {
        let plan = TreatmentPlan {
            id: None,
            treatment: "Vehicle".into(),
            expected_animal_weight: expected,
            expected_animal_weight_units: expected_unit,
            volume,
            volume_units: volume_unit,
            dose,
            dose_units: dose_unit,
        };

        let target = target_dose(&plan).unwrap();
        let volume_ml = plan.volume().to_base().unwrap();
        let expected_kg = plan.expected_weight().to_kilograms().unwrap();
        let via_concentration = concentration(&plan).unwrap() * volume_ml / expected_kg;

        // Rounding in the intermediate concentration bounds the agreement
        let tolerance = target.abs() * Decimal::new(1, 9) + Decimal::new(1, 20);
        prop_assert!((target - via_concentration).abs() <= tolerance);
    }

    #[test]
    fn weight_at_picks_latest_entry_on_or_before(
        days in proptest::collection::btree_set(0i64..365, 1..20),
        query in 0i64..400,
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let grams_on = |day: i64| Decimal::from(day + 1);

        // Newest first, so slice order cannot decide the result
        let weights: Vec<AnimalWeight> = days
            .iter()
            .rev()
            .map(|d| {
                let date = start + chrono::TimeDelta::days(*d);
                AnimalWeight::new(1, date, grams_on(*d), WeightUnit::Gram)
            })
            .collect();

        let expected = days.range(..=query).next_back().map(|d| grams_on(*d));
        let as_of = start + chrono::TimeDelta::days(query);
        prop_assert_eq!(weight_at(&weights, as_of).unwrap(), expected);
    }

    #[test]
    fn weight_at_ignores_later_entries(
        days in proptest::collection::vec(0i64..365, 1..20),
        value in stored_magnitude(),
        unit in weight_unit(),
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let weights: Vec<AnimalWeight> = days
            .iter()
            .map(|d| AnimalWeight::new(1, start + chrono::TimeDelta::days(*d + 1), value, unit))
            .collect();

        prop_assert_eq!(weight_at(&weights, start).unwrap(), None);
    }
}
