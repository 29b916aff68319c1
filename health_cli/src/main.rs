use clap::{Args, Parser, Subcommand};
use health_core::history::HEADER;
use health_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

mod prompt;
mod text_chart;

use prompt::Prompter;
use text_chart::TextChart;

#[derive(Parser)]
#[command(name = "health-tracker")]
#[command(about = "BMI, BMR, TDEE and water intake calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate metrics and optionally save them (default)
    Calc(CalcArgs),

    /// List saved entries
    History {
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },

    /// Show the BMI trend as a text chart
    Trend,
}

/// Any field not given here is asked for interactively
#[derive(Args, Default)]
pub(crate) struct CalcArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    age: Option<String>,

    /// Male or Female (anything starting with "m" counts as male)
    #[arg(long)]
    gender: Option<String>,

    #[arg(long)]
    height: Option<String>,

    /// Height unit: cm or m
    #[arg(long)]
    unit: Option<String>,

    /// Weight in kilograms
    #[arg(long)]
    weight: Option<String>,

    /// Activity level 1-5
    #[arg(long)]
    activity: Option<String>,

    /// Save without asking
    #[arg(long, conflicts_with = "no_save")]
    save: bool,

    /// Do not save and do not ask
    #[arg(long, conflicts_with = "save")]
    no_save: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    health_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config = match cli.data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    };
    let store = HistoryStore::from_config(&config);
    tracing::debug!("Using history file {:?}", store.path());

    match cli.command {
        Some(Commands::Calc(args)) => cmd_calc(args, &config, &store),
        Some(Commands::History { json }) => cmd_history(&store, json),
        Some(Commands::Trend) => cmd_trend(&store),
        None => {
            // Default to "calc" command
            cmd_calc(CalcArgs::default(), &config, &store)
        }
    }
}

fn cmd_calc(args: CalcArgs, config: &Config, store: &HistoryStore) -> Result<()> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    println!("Health Tracker");
    let raw = prompter.collect(&args, &config.defaults)?;

    let input = raw.validate_with(&config.defaults)?;
    let result = compute(&input)?;
    display_results(&input, &result);

    let save = if args.save {
        true
    } else if args.no_save {
        false
    } else {
        prompter.confirm("\nSave this entry to history? (y/n): ")?
    };

    if save {
        store.append(&HistoryEntry::new(&input, &result))?;
        println!("Saved to {}", store.path().display());
    } else {
        println!("Not saved. Bye!");
    }

    Ok(())
}

fn display_results(input: &BiometricInput, result: &MetricsResult) {
    println!("\n--- Results ---");
    if let Some(ref name) = input.name {
        println!("Name: {}", name);
    }
    println!("Age: {} years", input.age);
    println!("Gender: {}", input.gender);
    println!("Height: {:.1} cm", input.height_cm);
    println!("Weight: {:.1} kg", input.weight_kg);
    println!("BMI: {:.2} ({})", result.bmi, result.category);
    println!("BMR (Mifflin–St Jeor): {:.0} kcal/day", result.bmr);
    println!(
        "Estimated Daily Calories (TDEE) [{}]: {:.0} kcal/day",
        input.activity, result.tdee
    );
    println!("Recommended Water Intake: {:.2} L/day", result.water_liters);
}

fn cmd_history(store: &HistoryStore, json: bool) -> Result<()> {
    let entries = store.entries()?;

    if json {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for entry in &entries {
            serde_json::to_writer(&mut out, entry)?;
            writeln!(out)?;
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("No history yet. Save an entry first.");
        return Ok(());
    }

    println!(
        "{:<19}  {:<12} {:>3}  {:<6} {:>6} {:>6} {:>6}  {:<13} {:>5} {:>5} {:>5}  {}",
        HEADER[0], HEADER[1], HEADER[2], HEADER[3], HEADER[4], HEADER[5], HEADER[6],
        HEADER[7], HEADER[8], HEADER[9], HEADER[10], HEADER[11]
    );
    for entry in &entries {
        println!(
            "{:<19}  {:<12} {:>3}  {:<6} {:>6.1} {:>6.1} {:>6.2}  {:<13} {:>5.0} {:>5.0} {:>5.2}  {}",
            entry.timestamp.format(history::TIMESTAMP_FORMAT).to_string(),
            entry.name.as_deref().unwrap_or("-"),
            entry.age,
            entry.gender.label(),
            entry.height_cm,
            entry.weight_kg,
            entry.bmi,
            entry.category.label(),
            entry.bmr,
            entry.tdee,
            entry.water_l,
            entry.activity.map_or("-", |a| a.label()),
        );
    }
    println!("\n{} entries in {}", entries.len(), store.path().display());

    Ok(())
}

fn cmd_trend(store: &HistoryStore) -> Result<()> {
    let chart = TextChart::default();

    match show_bmi_trend(store, Some(&chart))? {
        TrendOutcome::Rendered(count) => println!("\n{} entries plotted", count),
        TrendOutcome::NoData => println!("No valid entries to plot."),
        TrendOutcome::Unavailable => println!("Charting is not available."),
    }

    Ok(())
}
