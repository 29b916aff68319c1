use libadwaita as adw;
use adw::prelude::*;
use adw::Application;
use gtk::prelude::*;
use gtk4 as gtk;
use health_core::history::{HEADER, TIMESTAMP_FORMAT};
use health_core::{
    compute, show_bmi_trend, ActivityLevel, BiometricInput, Config, HistoryEntry, HistoryStore,
    MetricsResult, RawInput, TrendChart, TrendOutcome,
};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use tracing::Level;

mod chart;

use chart::CairoTrendChart;

const GENDERS: [&str; 2] = ["Female", "Male"];
const UNITS: [&str; 2] = ["cm", "m"];

/// Form inputs plus the result and status areas
#[derive(Clone)]
struct FormWidgets {
    name: gtk::Entry,
    age: gtk::Entry,
    gender: gtk::DropDown,
    height: gtk::Entry,
    unit: gtk::DropDown,
    weight: gtk::Entry,
    activity: gtk::DropDown,
    results: gtk::Label,
    status: gtk::Label,
}

struct Ui {
    app: Application,
    config: Config,
    store: HistoryStore,
    form: FormWidgets,
    chart: Option<Box<dyn TrendChart>>,
}

fn init_logging(data_dir: &Path) {
    let log_path = data_dir.join("health_gui.log");
    let _ = std::fs::create_dir_all(data_dir);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || -> Box<dyn Write + Send> {
            match std::fs::File::options()
                .create(true)
                .append(true)
                .open(&log_path)
            {
                Ok(f) => Box::new(f),
                Err(_) => Box::new(std::io::stderr()),
            }
        })
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> glib::ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[health-gui] Config load failed: {}; using defaults.", e);
            Config::default()
        }
    };
    init_logging(&config.data.data_dir);

    let app = Application::builder()
        .application_id("io.github.healthtracker.Gui")
        .build();

    app.connect_activate(move |app| {
        build_window(app, config.clone());
    });

    app.run()
}

fn labelled_row(grid: &gtk::Grid, row: i32, text: &str, widget: &impl IsA<gtk::Widget>) {
    let label = gtk::Label::new(Some(text));
    label.set_xalign(0.0);
    grid.attach(&label, 0, row, 1, 1);
    grid.attach(widget, 1, row, 1, 1);
}

fn build_form(config: &Config) -> (gtk::Grid, FormWidgets) {
    let grid = gtk::Grid::new();
    grid.set_row_spacing(6);
    grid.set_column_spacing(12);

    let name = gtk::Entry::new();
    let age = gtk::Entry::new();
    let gender = gtk::DropDown::from_strings(&GENDERS);
    let height = gtk::Entry::new();
    let unit = gtk::DropDown::from_strings(&UNITS);
    let weight = gtk::Entry::new();
    let activity_labels: Vec<&str> = ActivityLevel::ALL.iter().map(|a| a.label()).collect();
    let activity = gtk::DropDown::from_strings(&activity_labels);

    let height_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    height_row.append(&height);
    height_row.append(&unit);

    labelled_row(&grid, 0, "Name", &name);
    labelled_row(&grid, 1, "Age (years)", &age);
    labelled_row(&grid, 2, "Gender", &gender);
    labelled_row(&grid, 3, "Height", &height_row);
    labelled_row(&grid, 4, "Weight (kg)", &weight);
    labelled_row(&grid, 5, "Activity Level", &activity);

    let results = gtk::Label::new(None);
    results.set_xalign(0.0);
    results.set_yalign(0.0);
    results.set_wrap(true);
    results.set_selectable(true);

    let status = gtk::Label::new(Some("Fill the form and click Calculate."));
    status.set_xalign(0.0);

    let form = FormWidgets {
        name,
        age,
        gender,
        height,
        unit,
        weight,
        activity,
        results,
        status,
    };
    reset_form(&form, config);

    (grid, form)
}

fn reset_form(form: &FormWidgets, config: &Config) {
    form.name.set_text("");
    form.age.set_text("");
    form.gender.set_selected(0);
    form.height.set_text("");
    let unit_idx = UNITS
        .iter()
        .position(|u| *u == config.defaults.height_unit.as_str())
        .unwrap_or(0);
    form.unit.set_selected(unit_idx as u32);
    form.weight.set_text("");
    form.activity
        .set_selected(config.defaults.activity.key().saturating_sub(1) as u32);
    form.results.set_text("");
}

fn read_form(form: &FormWidgets) -> RawInput {
    let pick = |options: &[&str], idx: u32| {
        options
            .get(idx as usize)
            .map(|s| s.to_string())
            .unwrap_or_default()
    };
    let activity = ActivityLevel::ALL
        .get(form.activity.selected() as usize)
        .map(|a| a.label().to_string())
        .unwrap_or_default();

    RawInput {
        name: form.name.text().to_string(),
        age: form.age.text().to_string(),
        gender: pick(&GENDERS, form.gender.selected()),
        height: form.height.text().to_string(),
        height_unit: pick(&UNITS, form.unit.selected()),
        weight: form.weight.text().to_string(),
        activity,
    }
}

fn format_results(input: &BiometricInput, result: &MetricsResult) -> String {
    let mut lines = Vec::new();
    if let Some(ref name) = input.name {
        lines.push(format!("Name: {}", name));
    }
    lines.push(format!("Age: {} years", input.age));
    lines.push(format!("Gender: {}", input.gender));
    lines.push(format!("Height: {:.1} cm", input.height_cm));
    lines.push(format!("Weight: {:.1} kg", input.weight_kg));
    lines.push(String::new());
    lines.push(format!("BMI: {:.2} ({})", result.bmi, result.category));
    lines.push(format!("BMR (Mifflin–St Jeor): {:.0} kcal/day", result.bmr));
    lines.push(format!(
        "Estimated Daily Calories (TDEE): {:.0} kcal/day",
        result.tdee
    ));
    lines.push(format!(
        "Recommended Water Intake: {:.2} L/day",
        result.water_liters
    ));
    lines.join("\n")
}

/// Validate and compute; errors go to the status line
fn calculate(ui: &Ui) -> Option<(BiometricInput, MetricsResult)> {
    let outcome = read_form(&ui.form)
        .validate_with(&ui.config.defaults)
        .and_then(|input| compute(&input).map(|result| (input, result)));

    match outcome {
        Ok(pair) => Some(pair),
        Err(e) => {
            ui.form.status.set_text(&e.to_string());
            None
        }
    }
}

fn build_window(app: &Application, config: Config) {
    let store = HistoryStore::from_config(&config);
    let (form_grid, form) = build_form(&config);

    let ui = Rc::new(Ui {
        app: app.clone(),
        config,
        store,
        form,
        chart: Some(Box::new(CairoTrendChart::new(app.clone()))),
    });

    let window = adw::ApplicationWindow::builder()
        .application(app)
        .default_width(760)
        .default_height(560)
        .title("Health Tracker")
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);
    window.set_content(Some(&content));

    let header = gtk::Label::new(Some("Health Tracker"));
    header.add_css_class("title-1");
    content.append(&header);

    let columns = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    columns.set_vexpand(true);
    content.append(&columns);

    let details = gtk::Frame::new(Some("Enter Details"));
    details.set_hexpand(true);
    details.set_child(Some(&form_grid));
    columns.append(&details);

    let results = gtk::Frame::new(Some("Results"));
    results.set_hexpand(true);
    results.set_child(Some(&ui.form.results));
    columns.append(&results);

    let button_row = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    content.append(&button_row);

    let calc = gtk::Button::with_label("Calculate");
    let save = gtk::Button::with_label("Save Entry");
    let history = gtk::Button::with_label("View History");
    let chart = gtk::Button::with_label("Show BMI Chart");
    let clear = gtk::Button::with_label("Clear");
    let folder = gtk::Button::with_label("Open Data Folder");
    chart.set_sensitive(ui.chart.is_some());

    for button in [&calc, &save, &history, &chart, &clear, &folder] {
        button_row.append(button);
    }
    content.append(&ui.form.status);

    {
        let ui = ui.clone();
        calc.connect_clicked(move |_| {
            if let Some((input, result)) = calculate(&ui) {
                ui.form.results.set_text(&format_results(&input, &result));
                ui.form
                    .status
                    .set_text("Calculated. Click Save Entry to save.");
            }
        });
    }

    {
        let ui = ui.clone();
        save.connect_clicked(move |_| {
            let Some((input, result)) = calculate(&ui) else {
                return;
            };
            ui.form.results.set_text(&format_results(&input, &result));
            match ui.store.append(&HistoryEntry::new(&input, &result)) {
                Ok(()) => {
                    let msg = format!("Saved to {}", ui.store.path().display());
                    ui.form.status.set_text(&msg);
                }
                Err(err) => {
                    tracing::error!("Failed to save entry: {}", err);
                    ui.form.status.set_text(&format!("Save failed: {}", err));
                }
            }
        });
    }

    {
        let ui = ui.clone();
        history.connect_clicked(move |_| {
            if let Err(err) = show_history_window(&ui) {
                tracing::error!("Failed to read history: {}", err);
                ui.form.status.set_text(&format!("Could not read history: {}", err));
            }
        });
    }

    {
        let ui = ui.clone();
        chart.connect_clicked(move |_| {
            let message = match show_bmi_trend(&ui.store, ui.chart.as_deref()) {
                Ok(TrendOutcome::Rendered(count)) => format!("Plotted {} entries.", count),
                Ok(TrendOutcome::NoData) => "No valid entries to plot.".to_string(),
                Ok(TrendOutcome::Unavailable) => "Charting is not available.".to_string(),
                Err(err) => {
                    tracing::error!("Failed to chart history: {}", err);
                    format!("Could not chart history: {}", err)
                }
            };
            ui.form.status.set_text(&message);
        });
    }

    {
        let ui = ui.clone();
        clear.connect_clicked(move |_| {
            reset_form(&ui.form, &ui.config);
            ui.form.status.set_text("Cleared.");
        });
    }

    {
        let ui = ui.clone();
        folder.connect_clicked(move |_| {
            let dir = &ui.config.data.data_dir;
            if !dir.exists() {
                ui.form
                    .status
                    .set_text("No data folder yet. Save an entry first.");
                return;
            }
            if let Err(err) = open::that(dir) {
                tracing::warn!("Failed to open {:?}: {}", dir, err);
                ui.form.status.set_text(&format!("Could not open folder: {}", err));
            }
        });
    }

    window.present();
}

fn show_history_window(ui: &Ui) -> health_core::Result<()> {
    if !ui.store.exists() {
        ui.form
            .status
            .set_text("No history yet. Save an entry first.");
        return Ok(());
    }
    let entries = ui.store.entries()?;

    let grid = gtk::Grid::new();
    grid.set_row_spacing(4);
    grid.set_column_spacing(16);
    grid.set_margin_top(12);
    grid.set_margin_bottom(12);
    grid.set_margin_start(12);
    grid.set_margin_end(12);

    for (col, heading) in HEADER.iter().enumerate() {
        let label = gtk::Label::new(Some(*heading));
        label.add_css_class("heading");
        grid.attach(&label, col as i32, 0, 1, 1);
    }

    for (row, entry) in entries.iter().enumerate() {
        let cells = [
            entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            entry.name.clone().unwrap_or_default(),
            entry.age.to_string(),
            entry.gender.label().to_string(),
            format!("{:.1}", entry.height_cm),
            format!("{:.1}", entry.weight_kg),
            format!("{:.2}", entry.bmi),
            entry.category.label().to_string(),
            format!("{:.0}", entry.bmr),
            format!("{:.0}", entry.tdee),
            format!("{:.2}", entry.water_l),
            entry.activity.map(|a| a.label().to_string()).unwrap_or_default(),
        ];
        for (col, text) in cells.iter().enumerate() {
            let label = gtk::Label::new(Some(text.as_str()));
            grid.attach(&label, col as i32, row as i32 + 1, 1, 1);
        }
    }

    let scroller = gtk::ScrolledWindow::new();
    scroller.set_vexpand(true);
    scroller.set_child(Some(&grid));

    let window = adw::ApplicationWindow::builder()
        .application(&ui.app)
        .default_width(900)
        .default_height(360)
        .title("History")
        .build();
    window.set_content(Some(&scroller));
    window.present();

    ui.form
        .status
        .set_text(&format!("Showing {} entries.", entries.len()));
    Ok(())
}
