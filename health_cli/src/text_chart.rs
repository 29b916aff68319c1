//! Horizontal bar chart of BMI over time for the terminal.

use health_core::history::TIMESTAMP_FORMAT;
use health_core::{Result, TrendChart, TrendPoint};

const DEFAULT_WIDTH: usize = 40;

pub struct TextChart {
    width: usize,
}

impl Default for TextChart {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
        }
    }
}

impl TextChart {
    /// One line per point; bar length scales with BMI relative to the
    /// largest value in the series
    pub fn lines(&self, points: &[TrendPoint]) -> Vec<String> {
        let max = points.iter().map(|p| p.bmi).fold(0.0_f64, f64::max);

        points
            .iter()
            .map(|point| {
                let len = if max > 0.0 {
                    ((point.bmi / max) * self.width as f64).round().max(0.0) as usize
                } else {
                    0
                };
                format!(
                    "{}  {:<width$}  {:.2}",
                    point.timestamp.format(TIMESTAMP_FORMAT),
                    "#".repeat(len),
                    point.bmi,
                    width = self.width
                )
            })
            .collect()
    }
}

impl TrendChart for TextChart {
    fn render(&self, points: &[TrendPoint]) -> Result<()> {
        println!("BMI Trend Over Time");
        for line in self.lines(points) {
            println!("{}", line);
        }
        Ok(())
    }
}
