//! Height unit conversion.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a height value was entered in
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeightUnit {
    #[default]
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "m")]
    Meters,
}

impl HeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Centimeters => "cm",
            HeightUnit::Meters => "m",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeightUnit {
    type Err = Error;

    /// Parses `cm` or `m`; blank text selects centimeters.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "cm" => Ok(HeightUnit::Centimeters),
            "m" => Ok(HeightUnit::Meters),
            other => Err(Error::InvalidInput(format!(
                "Unknown height unit '{}', expected 'cm' or 'm'",
                other
            ))),
        }
    }
}

/// Convert a height to meters. No bounds checking.
pub fn to_meters(value: f64, unit: HeightUnit) -> f64 {
    match unit {
        HeightUnit::Centimeters => value / 100.0,
        HeightUnit::Meters => value,
    }
}

/// Convert a height to centimeters. No bounds checking.
pub fn to_centimeters(value: f64, unit: HeightUnit) -> f64 {
    match unit {
        HeightUnit::Centimeters => value,
        HeightUnit::Meters => value * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_meters() {
        assert_eq!(to_meters(175.0, HeightUnit::Centimeters), 1.75);
        assert_eq!(to_meters(1.75, HeightUnit::Meters), 1.75);
    }

    #[test]
    fn test_to_centimeters() {
        assert_eq!(to_centimeters(175.0, HeightUnit::Centimeters), 175.0);
        assert_eq!(to_centimeters(2.0, HeightUnit::Meters), 200.0);
    }

    #[test]
    fn test_no_bounds_checking() {
        assert_eq!(to_meters(-50.0, HeightUnit::Centimeters), -0.5);
        assert_eq!(to_meters(0.0, HeightUnit::Meters), 0.0);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("cm".parse::<HeightUnit>().unwrap(), HeightUnit::Centimeters);
        assert_eq!(" M ".parse::<HeightUnit>().unwrap(), HeightUnit::Meters);
        assert_eq!("".parse::<HeightUnit>().unwrap(), HeightUnit::Centimeters);

        let err = "ft".parse::<HeightUnit>().unwrap_err();
        assert!(err.is_invalid_input());
    }
}
