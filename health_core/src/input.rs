//! Validation of raw user input.
//!
//! Both front ends collect text fields and hand them to [`RawInput::validate`],
//! which is the only place range checks happen.

use crate::config::DefaultsConfig;
use crate::units::{self, HeightUnit};
use crate::{ActivityLevel, BiometricInput, Error, Gender, Result};

/// Form fields exactly as typed by the user
#[derive(Clone, Debug, Default)]
pub struct RawInput {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub height_unit: String,
    pub weight: String,
    pub activity: String,
}

impl RawInput {
    /// Validate using the built-in defaults for blank unit and activity
    pub fn validate(&self) -> Result<BiometricInput> {
        self.validate_with(&DefaultsConfig::default())
    }

    /// Validate, falling back to `defaults` for a blank unit or an
    /// unrecognized activity choice
    pub fn validate_with(&self, defaults: &DefaultsConfig) -> Result<BiometricInput> {
        let age = parse_positive_int("Age", &self.age)?;

        let unit = if self.height_unit.trim().is_empty() {
            defaults.height_unit
        } else {
            self.height_unit.parse::<HeightUnit>()?
        };
        let height = parse_positive_real("Height", &self.height)?;
        let weight = parse_positive_real("Weight", &self.weight)?;

        let activity = ActivityLevel::from_choice(&self.activity).unwrap_or_else(|| {
            if !self.activity.trim().is_empty() {
                tracing::debug!(
                    "Unrecognized activity choice {:?}, using {:?}",
                    self.activity,
                    defaults.activity
                );
            }
            defaults.activity
        });

        let name = self.name.trim();

        Ok(BiometricInput {
            name: (!name.is_empty()).then(|| name.to_string()),
            age,
            gender: Gender::classify(&self.gender),
            height_cm: units::to_centimeters(height, unit),
            weight_kg: weight,
            activity,
        })
    }
}

/// Parse a strictly positive whole number
pub fn parse_positive_int(field: &str, text: &str) -> Result<u32> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a whole number", field)))?;
    if value <= 0 {
        return Err(Error::InvalidInput(format!(
            "{} must be greater than zero",
            field
        )));
    }
    u32::try_from(value).map_err(|_| Error::InvalidInput(format!("{} is too large", field)))
}

/// Parse a strictly positive, finite real number
pub fn parse_positive_real(field: &str, text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number", field)))?;
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!("{} must be a number", field)));
    }
    if value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(value)
}
