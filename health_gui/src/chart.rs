//! BMI trend window drawn with cairo.

use libadwaita as adw;
use adw::prelude::*;
use gtk4 as gtk;
use gtk::cairo;
use health_core::history::TIMESTAMP_FORMAT;
use health_core::{Result, TrendChart, TrendPoint};
use std::f64::consts::PI;

const MARGIN: f64 = 48.0;

pub struct CairoTrendChart {
    app: adw::Application,
}

impl CairoTrendChart {
    pub fn new(app: adw::Application) -> Self {
        Self { app }
    }
}

impl TrendChart for CairoTrendChart {
    fn render(&self, points: &[TrendPoint]) -> Result<()> {
        let points = points.to_vec();

        let area = gtk::DrawingArea::new();
        area.set_content_width(640);
        area.set_content_height(400);
        area.set_draw_func(move |_, cr, width, height| {
            if let Err(err) = draw_trend(cr, f64::from(width), f64::from(height), &points) {
                tracing::warn!("Failed to draw BMI trend: {}", err);
            }
        });

        let window = adw::ApplicationWindow::builder()
            .application(&self.app)
            .default_width(680)
            .default_height(440)
            .title("BMI Trend Over Time")
            .build();
        window.set_content(Some(&area));
        window.present();

        Ok(())
    }
}

/// Map each point to a fraction of the plot area: x by time, y by BMI
fn normalize(points: &[TrendPoint]) -> (Vec<(f64, f64)>, f64, f64) {
    let secs: Vec<f64> = points
        .iter()
        .map(|p| p.timestamp.and_utc().timestamp() as f64)
        .collect();
    let t_min = secs.iter().copied().fold(f64::INFINITY, f64::min);
    let t_max = secs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let b_min = points.iter().map(|p| p.bmi).fold(f64::INFINITY, f64::min);
    let b_max = points.iter().map(|p| p.bmi).fold(f64::NEG_INFINITY, f64::max);
    // Pad the BMI axis so flat series still show a line mid-plot
    let pad = ((b_max - b_min) * 0.1).max(0.5);
    let (lo, hi) = (b_min - pad, b_max + pad);

    let coords = secs
        .iter()
        .zip(points)
        .map(|(t, p)| {
            let x = if t_max > t_min {
                (t - t_min) / (t_max - t_min)
            } else {
                0.5
            };
            (x, (p.bmi - lo) / (hi - lo))
        })
        .collect();

    (coords, lo, hi)
}

fn draw_trend(
    cr: &cairo::Context,
    width: f64,
    height: f64,
    points: &[TrendPoint],
) -> std::result::Result<(), cairo::Error> {
    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.paint()?;

    let plot_w = (width - 2.0 * MARGIN).max(1.0);
    let plot_h = (height - 2.0 * MARGIN).max(1.0);
    let (coords, lo, hi) = normalize(points);

    // Axes
    cr.set_source_rgb(0.3, 0.3, 0.3);
    cr.set_line_width(1.0);
    cr.move_to(MARGIN, MARGIN);
    cr.line_to(MARGIN, MARGIN + plot_h);
    cr.line_to(MARGIN + plot_w, MARGIN + plot_h);
    cr.stroke()?;

    cr.set_font_size(11.0);
    cr.move_to(4.0, MARGIN + 4.0);
    cr.show_text(&format!("{:.1}", hi))?;
    cr.move_to(4.0, MARGIN + plot_h);
    cr.show_text(&format!("{:.1}", lo))?;
    cr.move_to(MARGIN + plot_w / 2.0 - 12.0, MARGIN - 12.0);
    cr.show_text("BMI")?;

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        cr.move_to(MARGIN, MARGIN + plot_h + 18.0);
        cr.show_text(&first.timestamp.format(TIMESTAMP_FORMAT).to_string())?;
        cr.move_to(MARGIN + plot_w - 110.0, MARGIN + plot_h + 34.0);
        cr.show_text(&last.timestamp.format(TIMESTAMP_FORMAT).to_string())?;
    }

    let to_canvas = |(x, y): (f64, f64)| (MARGIN + x * plot_w, MARGIN + (1.0 - y) * plot_h);

    // Series line
    cr.set_source_rgb(0.2, 0.4, 0.8);
    cr.set_line_width(2.0);
    for (idx, coord) in coords.iter().enumerate() {
        let (x, y) = to_canvas(*coord);
        if idx == 0 {
            cr.move_to(x, y);
        } else {
            cr.line_to(x, y);
        }
    }
    cr.stroke()?;

    // Markers
    for coord in &coords {
        let (x, y) = to_canvas(*coord);
        cr.arc(x, y, 3.5, 0.0, 2.0 * PI);
        cr.fill()?;
    }

    Ok(())
}
