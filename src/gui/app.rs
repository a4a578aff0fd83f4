//! Bike Dashboard Main Application
//! Main window with the filter panel and the dashboard body.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{RentalDataset, RentalLoader};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::summarize;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use tracing::{error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Box<RentalDataset>),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    dataset: Option<RentalDataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let data_path = config.data.path.clone();
        let mut app = Self::idle(config);
        app.start_loading(data_path);
        app
    }

    /// App with nothing loaded yet.
    fn idle(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Load the CSV on a background thread; the result is picked up in `update`.
    fn start_loading(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }

        self.dataset = None;
        self.chart_viewer.clear();
        self.control_panel.export_enabled = false;
        self.control_panel.data_path = Some(path.clone());
        self.control_panel.set_progress(0.0, "Loading CSV file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));
            match RentalLoader::load_csv(&path) {
                Ok(dataset) => {
                    let _ = tx.send(LoadResult::Complete(Box::new(dataset)));
                }
                Err(e) => {
                    let _ = tx.send(LoadResult::Error(e.to_string()));
                }
            }
        });
    }

    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };
        let mut should_keep_receiver = true;

        while let Ok(result) = rx.try_recv() {
            match result {
                LoadResult::Progress(status) => {
                    self.control_panel.set_progress(10.0, &status);
                }
                LoadResult::Complete(dataset) => {
                    self.control_panel
                        .set_options(dataset.years().to_vec(), dataset.seasons().to_vec());
                    self.dataset = Some(*dataset);
                    self.is_loading = false;
                    should_keep_receiver = false;
                    self.refresh();
                }
                LoadResult::Error(message) => {
                    error!(%message, "failed to load data");
                    self.control_panel
                        .set_progress(0.0, &format!("Error: {}", message));
                    self.is_loading = false;
                    should_keep_receiver = false;
                }
            }
        }

        if should_keep_receiver {
            self.load_rx = Some(rx);
        }
    }

    /// Recompute the dashboard for the current filters.
    fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        match summarize(dataset, &self.control_panel.selection) {
            Ok(summary) => {
                let status = format!(
                    "{} of {} rows selected",
                    summary.kpis.rows,
                    dataset.row_count()
                );
                self.chart_viewer.set_summary(summary);
                self.control_panel.export_enabled = true;
                self.control_panel.set_progress(100.0, &status);
            }
            Err(e) => {
                error!(error = %e, "failed to aggregate");
                self.control_panel.export_enabled = false;
                self.control_panel.set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }

    fn handle_export(&mut self) {
        let Some(summary) = &self.chart_viewer.summary else {
            self.control_panel.set_progress(0.0, "No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.export.dir)
            .pick_folder()
        else {
            return;
        };

        let export = &self.config.export;
        match StaticChartRenderer::export(summary, &dir, export.width, export.height) {
            Ok(report) => {
                info!(dir = %report.dir.display(), "charts exported");
                self.control_panel.set_progress(
                    100.0,
                    &format!("Exported {} files to {}", report.files.len(), report.dir.display()),
                );
                if let Err(e) = open::that(&report.dir) {
                    warn!(error = %e, "could not open export folder");
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.control_panel
                    .set_progress(0.0, &format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::FiltersChanged => self.refresh(),
                        ControlPanelAction::Export => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
datetime,season,holiday,workingday,weather,temp,atemp,humidity,windspeed,casual,registered,count
2011-01-01 00:00:00,1,0,0,1,9.84,14.395,81,0,3,13,16
2011-07-04 13:00:00,3,1,0,1,33.62,40.15,59,0,55,180,235
";

    fn loaded_app() -> DashboardApp {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();
        let dataset = RentalLoader::load_csv(file.path()).unwrap();

        let mut app = DashboardApp::idle(DashboardConfig::default());
        app.control_panel
            .set_options(dataset.years().to_vec(), dataset.seasons().to_vec());
        app.dataset = Some(dataset);
        app.refresh();
        app
    }

    #[test]
    fn refresh_summarizes_loaded_data() {
        let app = loaded_app();
        let summary = app.chart_viewer.summary.as_ref().unwrap();
        assert_eq!(summary.kpis.rows, 2);
        assert!(app.control_panel.export_enabled);
    }

    #[test]
    fn reloading_drops_the_previous_dataset() {
        let mut app = loaded_app();
        app.start_loading(PathBuf::from("/no/such/rentals.csv"));

        assert!(app.dataset.is_none());
        assert!(app.chart_viewer.summary.is_none());

        // a filter change before the new file arrives draws nothing stale
        app.refresh();
        assert!(app.chart_viewer.summary.is_none());
        assert!(!app.control_panel.export_enabled);
    }
}
