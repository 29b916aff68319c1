//! BMI trend charting as an optional capability.
//!
//! The core never draws anything. Front ends that can plot inject a
//! [`TrendChart`]; when none is available the request reports
//! [`TrendOutcome::Unavailable`] and nothing else changes.

use crate::history::HistoryStore;
use crate::{Result, TrendPoint};

/// Something that can display a BMI time series
pub trait TrendChart {
    fn render(&self, points: &[TrendPoint]) -> Result<()>;
}

/// What happened when a trend chart was requested
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendOutcome {
    /// No renderer was provided
    Unavailable,
    /// The store is missing or has no plottable rows
    NoData,
    /// The chart was rendered with this many points
    Rendered(usize),
}

/// Load the BMI series from `store` and hand it to `chart`, if any
pub fn show_bmi_trend(
    store: &HistoryStore,
    chart: Option<&dyn TrendChart>,
) -> Result<TrendOutcome> {
    let Some(chart) = chart else {
        tracing::info!("No trend chart renderer available");
        return Ok(TrendOutcome::Unavailable);
    };

    let points = store.bmi_trend()?;
    if points.is_empty() {
        return Ok(TrendOutcome::NoData);
    }

    chart.render(&points)?;
    tracing::debug!("Rendered BMI trend with {} points", points.len());
    Ok(TrendOutcome::Rendered(points.len()))
}
