//! Chart Viewer Widget
//! Central scrollable panel: title, KPI row and the six summary charts.

use crate::charts::ChartPlotter;
use crate::stats::{ChartView, DashboardSummary};
use egui::{RichText, ScrollArea};

const SECTION_SPACING: f32 = 18.0;

/// Scrollable dashboard body.
#[derive(Default)]
pub struct ChartViewer {
    pub summary: Option<DashboardSummary>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.summary = None;
    }

    pub fn set_summary(&mut self, summary: DashboardSummary) {
        self.summary = Some(summary);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("🚴 Washington D.C. Bike Rentals Dashboard")
                        .size(26.0)
                        .strong(),
                );
                ui.label("Interactive dashboard summarizing bike rental patterns (2011–2012).");
                ui.add_space(10.0);

                let Some(summary) = &self.summary else {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                    });
                    return;
                };

                ChartPlotter::draw_kpis(ui, &summary.kpis);
                ui.add_space(8.0);
                ui.separator();

                for view in ChartView::ALL {
                    ui.add_space(SECTION_SPACING);
                    ChartPlotter::draw_view(ui, summary, view);
                }
                ui.add_space(SECTION_SPACING);
            });
    }
}
