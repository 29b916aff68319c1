//! Metrics engine: BMI, BMR, TDEE and water intake.
//!
//! Every function here is pure. Rounding is a presentation concern and
//! happens only when results are displayed or persisted.

use crate::units::{self, HeightUnit};
use crate::{BiometricInput, BmiCategory, Error, Gender, MetricsResult, Result};

/// Liters of water recommended per kilogram of body weight
pub const WATER_LITERS_PER_KG: f64 = 0.035;

/// Body mass index from weight in kilograms and height in meters
pub fn bmi(weight_kg: f64, height_m: f64) -> Result<f64> {
    // Also rejects NaN
    if !(height_m > 0.0) {
        return Err(Error::InvalidInput("Height must be > 0".into()));
    }
    Ok(weight_kg / (height_m * height_m))
}

/// Classify a BMI value
///
/// Intervals are half-open: [0, 18.5), [18.5, 25), [25, 30), [30, ∞).
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::NormalWeight
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Basal metabolic rate (Mifflin–St Jeor), kcal/day
pub fn bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Total daily energy expenditure, kcal/day
pub fn tdee(bmr: f64, activity_multiplier: f64) -> f64 {
    bmr * activity_multiplier
}

/// Recommended daily water intake in liters
pub fn water_intake_liters(weight_kg: f64) -> f64 {
    weight_kg * WATER_LITERS_PER_KG
}

/// Run the full calculation for one set of inputs
pub fn compute(input: &BiometricInput) -> Result<MetricsResult> {
    let height_m = units::to_meters(input.height_cm, HeightUnit::Centimeters);
    let bmi = bmi(input.weight_kg, height_m)?;
    let bmr = bmr(input.gender, input.weight_kg, input.height_cm, input.age);

    tracing::debug!(bmi, bmr, activity = ?input.activity, "Computed metrics");

    Ok(MetricsResult {
        bmi,
        category: bmi_category(bmi),
        bmr,
        tdee: tdee(bmr, input.activity.multiplier()),
        water_liters: water_intake_liters(input.weight_kg),
    })
}
