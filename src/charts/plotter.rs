//! Chart Plotter Module
//! Draws the KPI row and the six summary views with egui / egui_plot.

use crate::charts::{
    coolwarm, format_correlation, format_max, format_mean, format_total, heatmap_text_is_light,
    palette, SERIES_RGB,
};
use crate::stats::{CategoryMean, ChartKind, ChartView, CorrelationMatrix, DashboardSummary, Kpis};
use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, PlotUi, Points};

const CHART_HEIGHT: f32 = 280.0;
const CELL_SIZE: egui::Vec2 = egui::vec2(72.0, 26.0);

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Draws dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Three metric cards side by side.
    pub fn draw_kpis(ui: &mut egui::Ui, kpis: &Kpis) {
        let cards = [
            ("Total Rentals", format_total(kpis.total)),
            ("Average Hourly Rentals", format_mean(kpis.mean)),
            ("Max Hourly Rentals", format_max(kpis.max)),
        ];

        ui.columns(cards.len(), |columns| {
            for (ui, (label, value)) in columns.iter_mut().zip(cards) {
                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(6.0)
                    .inner_margin(10.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                        ui.label(RichText::new(value).size(28.0).strong());
                    });
            }
        });
    }

    /// Subheader plus the chart for one view.
    pub fn draw_view(ui: &mut egui::Ui, summary: &DashboardSummary, view: ChartView) {
        ui.label(RichText::new(view.title()).size(17.0).strong());
        ui.add_space(4.0);

        match (view.kind(), summary.series(view)) {
            (ChartKind::Heatmap, _) => Self::draw_heatmap(ui, &summary.correlation),
            (_, Some([])) => {
                ui.label(RichText::new("No rows match the current filters").color(Color32::GRAY));
            }
            (ChartKind::Bar, Some(series)) => Self::draw_bar_chart(ui, view, series),
            (ChartKind::Line, Some(series)) => Self::draw_line_chart(ui, view, series),
            (_, None) => {}
        }
    }

    /// Categorical x axis with one labelled tick per entry in `series`.
    fn show_category_plot(
        ui: &mut egui::Ui,
        view: ChartView,
        series: &[CategoryMean],
        add_contents: impl FnOnce(&mut PlotUi),
    ) {
        let labels: Vec<String> = series.iter().map(|c| c.label.clone()).collect();
        let n = labels.len();

        Plot::new(format!("plot_{}", view.file_stem()))
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_label(view.x_label())
            .y_axis_label("count")
            .x_grid_spacer(move |_input| {
                (0..n)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx - mark.value).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, add_contents);
    }

    fn draw_bar_chart(ui: &mut egui::Ui, view: ChartView, series: &[CategoryMean]) {
        let bars: Vec<Bar> = series
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Bar::new(i as f64, c.mean)
                    .width(0.6)
                    .fill(rgb(palette(i)))
                    .name(format!("{} ({} rows)", c.label, c.rows))
            })
            .collect();

        Self::show_category_plot(ui, view, series, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(view.x_label()));
        });
    }

    fn draw_line_chart(ui: &mut egui::Ui, view: ChartView, series: &[CategoryMean]) {
        let points: Vec<[f64; 2]> = series
            .iter()
            .enumerate()
            .map(|(i, c)| [i as f64, c.mean])
            .collect();
        let color = rgb(SERIES_RGB);

        Self::show_category_plot(ui, view, series, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from_iter(points.iter().copied()))
                    .color(color)
                    .width(2.0)
                    .name("mean count"),
            );
            plot_ui.points(
                Points::new(PlotPoints::from_iter(points.iter().copied()))
                    .radius(4.0)
                    .color(color),
            );
        });
    }

    /// Annotated correlation grid.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        if matrix.is_empty() {
            ui.label(RichText::new("No numeric columns").color(Color32::GRAY));
            return;
        }

        egui::ScrollArea::horizontal()
            .id_salt("heatmap_scroll")
            .show(ui, |ui| {
                egui::Grid::new("correlation_heatmap")
                    .spacing([2.0, 2.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for name in &matrix.columns {
                            ui.label(RichText::new(name).size(11.0).strong());
                        }
                        ui.end_row();

                        for (i, row_name) in matrix.columns.iter().enumerate() {
                            ui.label(RichText::new(row_name).size(11.0).strong());
                            for (j, col_name) in matrix.columns.iter().enumerate() {
                                let value = matrix.get(i, j).unwrap_or(f64::NAN);
                                let (rect, response) =
                                    ui.allocate_exact_size(CELL_SIZE, Sense::hover());
                                let text_color = if heatmap_text_is_light(value) {
                                    Color32::WHITE
                                } else {
                                    Color32::BLACK
                                };
                                ui.painter().rect_filled(rect, 2.0, rgb(coolwarm(value)));
                                ui.painter().text(
                                    rect.center(),
                                    Align2::CENTER_CENTER,
                                    format_correlation(value),
                                    FontId::proportional(11.0),
                                    text_color,
                                );
                                response.on_hover_text(format!(
                                    "{} × {}: {}",
                                    row_name,
                                    col_name,
                                    format_correlation(value)
                                ));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
