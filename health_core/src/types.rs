//! Core domain types for the health tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Gender and activity level enumerations
//! - BMI categories
//! - Calculation inputs and results
//! - Persisted history entries

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations
// ============================================================================

/// Gender used to select the Mifflin–St Jeor constant
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Classify free text: anything starting with `m` (after trimming,
    /// case-insensitive) is male, everything else is female.
    pub fn classify(text: &str) -> Self {
        if text.trim().to_lowercase().starts_with('m') {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn is_male(&self) -> bool {
        matches!(self, Gender::Male)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Activity level and its TDEE multiplier
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// All levels in menu order
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary (little/no exercise)",
            ActivityLevel::Light => "Light (1–3 days/wk)",
            ActivityLevel::Moderate => "Moderate (3–5 days/wk)",
            ActivityLevel::Active => "Active (6–7 days/wk)",
            ActivityLevel::VeryActive => "Very Active (hard exercise)",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    /// Menu key, `1` through `5`
    pub fn key(&self) -> usize {
        Self::ALL
            .iter()
            .position(|level| level == self)
            .map_or(0, |idx| idx + 1)
    }

    /// Look up a level by menu key (`"3"`) or by its exact label
    pub fn from_choice(choice: &str) -> Option<Self> {
        let choice = choice.trim();
        if let Ok(key) = choice.parse::<usize>() {
            return key.checked_sub(1).and_then(|idx| Self::ALL.get(idx).copied());
        }
        Self::from_label(choice)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.label() == label)
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// BMI classification over half-open intervals
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BmiCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim() {
            "Underweight" => Ok(BmiCategory::Underweight),
            "Normal weight" => Ok(BmiCategory::NormalWeight),
            "Overweight" => Ok(BmiCategory::Overweight),
            "Obese" => Ok(BmiCategory::Obese),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown BMI category '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Calculation Types
// ============================================================================

/// Validated inputs for one calculation
#[derive(Clone, Debug, PartialEq)]
pub struct BiometricInput {
    pub name: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
}

/// Derived metrics, unrounded
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MetricsResult {
    pub bmi: f64,
    pub category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
    pub water_liters: f64,
}

// ============================================================================
// History Types
// ============================================================================

/// One persisted row of the history log.
///
/// Numeric fields hold the values at their persisted precision. Serializes
/// with the same timestamp and activity text as the CSV columns.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HistoryEntry {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub name: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub bmr: f64,
    pub tdee: f64,
    pub water_l: f64,
    #[serde(serialize_with = "serialize_activity_label")]
    pub activity: Option<ActivityLevel>,
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(crate::history::TIMESTAMP_FORMAT))
}

fn serialize_activity_label<S: Serializer>(
    activity: &Option<ActivityLevel>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match activity {
        Some(level) => serializer.serialize_some(level.label()),
        None => serializer.serialize_none(),
    }
}

/// A single point of the BMI time series
#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub bmi: f64,
}
