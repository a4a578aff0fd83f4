//! Bike Dashboard - Washington D.C. bike rental explorer
//!
//! Opens the interactive dashboard, or with `--export` renders the charts
//! for one filter selection to a directory and exits.

use anyhow::{anyhow, bail, Context};
use bike_dashboard::charts::StaticChartRenderer;
use bike_dashboard::config::DashboardConfig;
use bike_dashboard::data::{FilterSelection, RentalDataset, RentalLoader, Season, WorkingDayFilter};
use bike_dashboard::gui::DashboardApp;
use bike_dashboard::logging::init_logging;
use bike_dashboard::pipeline::summarize;
use clap::Parser;
use eframe::egui;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Rental CSV to load (overrides `[data] path`)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render the charts into DIR and exit instead of opening the window
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Year to include in the export (repeatable, default all)
    #[arg(long = "year")]
    years: Vec<i32>,

    /// Season to include in the export (repeatable, default all)
    #[arg(long = "season")]
    seasons: Vec<String>,

    /// Working day filter for the export: both, working, non-working
    #[arg(long, default_value = "both")]
    working_day: String,
}

impl Cli {
    /// Filter selection for headless export; empty lists mean "everything".
    fn selection(&self, dataset: &RentalDataset) -> anyhow::Result<FilterSelection> {
        let mut selection = FilterSelection::all(dataset);

        if !self.years.is_empty() {
            selection.years = self.years.iter().copied().collect();
        }
        if !self.seasons.is_empty() {
            selection.seasons = self
                .seasons
                .iter()
                .map(|s| Season::from_label(s).ok_or_else(|| anyhow!("unknown season: {}", s)))
                .collect::<anyhow::Result<_>>()?;
        }
        selection.working_day = self
            .working_day
            .parse::<WorkingDayFilter>()
            .map_err(|e| anyhow!(e.to_string()))?;

        Ok(selection)
    }
}

fn run_export(cli: &Cli, config: &DashboardConfig, dir: &Path) -> anyhow::Result<()> {
    let dataset = RentalLoader::load_csv(&config.data.path)
        .with_context(|| format!("loading {}", config.data.path.display()))?;
    let selection = cli.selection(&dataset)?;
    let summary = summarize(&dataset, &selection)?;

    let report = StaticChartRenderer::export(
        &summary,
        dir,
        config.export.width,
        config.export.height,
    )?;
    for file in &report.files {
        println!("{}", file.display());
    }
    info!(rows = summary.kpis.rows, "headless export finished");
    Ok(())
}

fn run_window(config: DashboardConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("DC Bike Rental"),
        ..Default::default()
    };

    eframe::run_native(
        "DC Bike Rental",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("window error: {}", e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = DashboardConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging.level);
    match &source {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("no config file found, using defaults"),
    }

    if let Some(path) = &cli.data {
        config.data.path = path.clone();
    }
    info!(data = %config.data.path.display(), "starting");

    match &cli.export {
        Some(dir) => run_export(&cli, &config, dir),
        None if !cli.years.is_empty() || !cli.seasons.is_empty() => {
            bail!("--year and --season only apply together with --export")
        }
        None => run_window(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_export_filters() {
        let cli = Cli::try_parse_from([
            "bike_dashboard",
            "--data",
            "train.csv",
            "--export",
            "out",
            "--year",
            "2011",
            "--season",
            "fall",
            "--season",
            "winter",
            "--working-day",
            "non-working",
        ])
        .unwrap();

        assert_eq!(cli.data, Some(PathBuf::from("train.csv")));
        assert_eq!(cli.export, Some(PathBuf::from("out")));
        assert_eq!(cli.years, vec![2011]);
        assert_eq!(cli.seasons, vec!["fall", "winter"]);
        assert_eq!(cli.working_day, "non-working");
    }

    #[test]
    fn cli_defaults_to_window_mode() {
        let cli = Cli::try_parse_from(["bike_dashboard"]).unwrap();
        assert!(cli.export.is_none());
        assert!(cli.years.is_empty());
        assert_eq!(cli.working_day, "both");
    }
}
