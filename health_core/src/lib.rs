#![forbid(unsafe_code)]

//! Core domain model and business logic for the health tracker.
//!
//! This crate provides:
//! - Domain types (inputs, results, history entries)
//! - Height unit conversion
//! - The metrics engine (BMI, BMR, TDEE, water intake)
//! - Input validation shared by the front ends
//! - CSV history persistence
//! - An optional trend-chart capability

pub mod types;
pub mod error;
pub mod units;
pub mod metrics;
pub mod input;
pub mod config;
pub mod logging;
pub mod history;
pub mod chart;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use units::HeightUnit;
pub use config::Config;
pub use input::RawInput;
pub use metrics::compute;
pub use history::{HistoryRecords, HistoryStore};
pub use chart::{show_bmi_trend, TrendChart, TrendOutcome};
