//! Control Panel Widget
//! Left side panel with the dataset source, filters and export controls.

use crate::data::{FilterSelection, Season, WorkingDayFilter};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Left side control panel with filter widgets and progress.
pub struct ControlPanel {
    pub selection: FilterSelection,
    pub data_path: Option<PathBuf>,
    pub years: Vec<i32>,
    pub seasons: Vec<Season>,
    pub progress: f32,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: FilterSelection::default(),
            data_path: None,
            years: Vec::new(),
            seasons: Vec::new(),
            progress: 0.0,
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the years and seasons of a freshly loaded dataset, all selected.
    pub fn set_options(&mut self, years: Vec<i32>, seasons: Vec<Season>) {
        self.selection = FilterSelection {
            years: years.iter().copied().collect(),
            seasons: seasons.iter().copied().collect(),
            working_day: WorkingDayFilter::Both,
        };
        self.years = years;
        self.seasons = seasons;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚴 Bike Rentals")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Washington D.C.").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file loaded".to_string());
                    ui.label(RichText::new(path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Open").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.label("Select Year(s)");
        let mut changed = false;
        ui.horizontal_wrapped(|ui| {
            for year in &self.years {
                let mut checked = self.selection.years.contains(year);
                if ui.checkbox(&mut checked, year.to_string()).changed() {
                    if checked {
                        self.selection.years.insert(*year);
                    } else {
                        self.selection.years.remove(year);
                    }
                    changed = true;
                }
            }
        });

        ui.add_space(8.0);
        ui.label("Select Season(s)");
        ui.horizontal_wrapped(|ui| {
            for season in &self.seasons {
                let mut checked = self.selection.seasons.contains(season);
                if ui.checkbox(&mut checked, season.label()).changed() {
                    if checked {
                        self.selection.seasons.insert(*season);
                    } else {
                        self.selection.seasons.remove(season);
                    }
                    changed = true;
                }
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selection.years = self.years.iter().copied().collect();
                self.selection.seasons = self.seasons.iter().copied().collect();
                changed = true;
            }
            if ui.small_button("Clear All").clicked() {
                self.selection.years.clear();
                self.selection.seasons.clear();
                changed = true;
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_sized([120.0, 20.0], egui::Label::new("Working Day Filter:"));
            ComboBox::from_id_salt("working_day")
                .width(170.0)
                .selected_text(self.selection.working_day.label())
                .show_ui(ui, |ui| {
                    for option in WorkingDayFilter::ALL {
                        if ui
                            .selectable_value(&mut self.selection.working_day, option, option.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
        });

        if changed {
            action = ControlPanelAction::FiltersChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("📄 Export Charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Export;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.progress >= 100.0 {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    FiltersChanged,
    Export,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_options_selects_everything() {
        let mut panel = ControlPanel::new();
        panel.selection.working_day = WorkingDayFilter::WorkingOnly;
        panel.set_options(vec![2011, 2012], vec![Season::Spring, Season::Fall]);

        assert_eq!(panel.selection.years.len(), 2);
        assert!(panel.selection.seasons.contains(&Season::Fall));
        assert_eq!(panel.selection.working_day, WorkingDayFilter::Both);
    }

    #[test]
    fn progress_updates_status() {
        let mut panel = ControlPanel::new();
        panel.set_progress(100.0, "Loaded 10 rows");
        assert_eq!(panel.status, "Loaded 10 rows");
        assert_eq!(panel.progress, 100.0);
    }
}
