//! Static Chart Renderer
//! Renders the six views to PNG files with plotters and writes a JSON summary.
//!
//! Output directory layout:
//!   season.png, hour.png, working_day.png, month.png, weather.png,
//!   correlation.png, summary.json

use crate::charts::{coolwarm, format_correlation, heatmap_text_is_light, palette, SERIES_RGB};
use crate::stats::{CategoryMean, ChartKind, ChartView, CorrelationMatrix, DashboardSummary};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to draw {chart}: {message}")]
    Draw { chart: &'static str, message: String },
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to write summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid image size {0}x{1}")]
    Size(u32, u32),
}

/// Files written by one export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Upper bound of the value axis: 10% headroom, at least 1.
pub fn value_axis_max(series: &[CategoryMean]) -> f64 {
    let max = series
        .iter()
        .map(|c| c.mean)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    (max * 1.1).max(1.0)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every view plus `summary.json` into `dir`, creating it if needed.
    pub fn export(
        summary: &DashboardSummary,
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<ExportReport, RenderError> {
        fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut report = ExportReport {
            dir: dir.to_path_buf(),
            files: Vec::new(),
        };

        for view in ChartView::ALL {
            let png = Self::render_view_png(summary, view, width, height)?;
            let path = dir.join(format!("{}.png", view.file_stem()));
            fs::write(&path, png).map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
            report.files.push(path);
        }

        let json_path = dir.join("summary.json");
        let file = File::create(&json_path).map_err(|source| RenderError::Io {
            path: json_path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), summary)?;
        report.files.push(json_path);

        info!(dir = %dir.display(), files = report.files.len(), "export complete");
        Ok(report)
    }

    /// Render one view to in-memory PNG bytes.
    pub fn render_view_png(
        summary: &DashboardSummary,
        view: ChartView,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::Size(width, height));
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        let drawn = match (view.kind(), summary.series(view)) {
            (ChartKind::Heatmap, _) => {
                Self::draw_heatmap(&mut buffer, (width, height), &summary.correlation)
            }
            (kind, Some(series)) => {
                Self::draw_category_chart(&mut buffer, (width, height), view, kind, series)
            }
            (_, None) => Ok(()),
        };
        drawn.map_err(|e| RenderError::Draw {
            chart: view.file_stem(),
            message: e.to_string(),
        })?;

        let image = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Size(width, height))?;
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image).write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    fn draw_category_chart(
        buffer: &mut [u8],
        size: (u32, u32),
        view: ChartView,
        kind: ChartKind,
        series: &[CategoryMean],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
        root.fill(&WHITE)?;

        if series.is_empty() {
            root.titled(view.title(), (FONT, 22))?.draw(&Text::new(
                "No rows match the current filters",
                (20, 40),
                (FONT, 16).into_font().color(&BLACK.mix(0.6)),
            ))?;
            root.present()?;
            return Ok(());
        }

        let labels: Vec<&str> = series.iter().map(|c| c.label.as_str()).collect();
        let y_max = value_axis_max(series);

        let mut chart = ChartBuilder::on(&root)
            .caption(view.title(), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0..series.len()).into_segmented(), 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(view.x_label())
            .y_desc("count")
            .x_labels(series.len())
            .x_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i).map(|s| s.to_string()).unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .draw()?;

        match kind {
            ChartKind::Line => {
                let color = rgb(SERIES_RGB);
                let points: Vec<(SegmentValue<usize>, f64)> = series
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (SegmentValue::CenterOf(i), c.mean))
                    .collect();
                chart.draw_series(LineSeries::new(points.iter().cloned(), color.stroke_width(2)))?;
                chart.draw_series(
                    points
                        .iter()
                        .cloned()
                        .map(|p| Circle::new(p, 4, color.filled())),
                )?;
            }
            _ => {
                chart.draw_series(series.iter().enumerate().map(|(i, c)| {
                    let mut bar = Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), c.mean)],
                        rgb(palette(i)).filled(),
                    );
                    bar.set_margin(0, 0, 10, 10);
                    bar
                }))?;
            }
        }

        root.present()?;
        Ok(())
    }

    fn draw_heatmap(
        buffer: &mut [u8],
        size: (u32, u32),
        matrix: &CorrelationMatrix,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
        root.fill(&WHITE)?;

        let n = matrix.len();
        if n == 0 {
            root.titled(ChartView::Correlation.title(), (FONT, 22))?;
            root.present()?;
            return Ok(());
        }

        // Row 0 is drawn at the top
        let flip = |i: usize| n - 1 - i;
        let names = &matrix.columns;

        let mut chart = ChartBuilder::on(&root)
            .caption(ChartView::Correlation.title(), (FONT, 22))
            .margin(12)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .x_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => names.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) if *i < n => {
                    names.get(flip(*i)).cloned().unwrap_or_default()
                }
                _ => String::new(),
            })
            .draw()?;

        let cells = (0..n).flat_map(|i| (0..n).map(move |j| (i, j)));
        chart.draw_series(cells.clone().map(|(i, j)| {
            let value = matrix.get(i, j).unwrap_or(f64::NAN);
            let y = flip(i);
            Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(y + 1)),
                ],
                rgb(coolwarm(value)).filled(),
            )
        }))?;

        chart.draw_series(cells.map(|(i, j)| {
            let value = matrix.get(i, j).unwrap_or(f64::NAN);
            let color = if heatmap_text_is_light(value) { WHITE } else { BLACK };
            EmptyElement::at((SegmentValue::CenterOf(j), SegmentValue::CenterOf(flip(i))))
                + Text::new(
                    format_correlation(value),
                    (-14, -7),
                    (FONT, 13).into_font().color(&color),
                )
        }))?;

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(label: &str, mean: f64) -> CategoryMean {
        CategoryMean {
            label: label.to_string(),
            mean,
            rows: 1,
        }
    }

    fn empty_summary() -> DashboardSummary {
        DashboardSummary {
            kpis: crate::stats::Kpis {
                rows: 0,
                total: 0,
                mean: f64::NAN,
                max: None,
            },
            by_season: vec![],
            by_hour: vec![],
            by_working_day: vec![],
            by_month: vec![],
            by_weather: vec![],
            correlation: CorrelationMatrix::default(),
        }
    }

    #[test]
    fn value_axis_has_headroom() {
        let series = vec![mean("a", 50.0), mean("b", 200.0)];
        assert!((value_axis_max(&series) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn value_axis_never_collapses() {
        assert_eq!(value_axis_max(&[]), 1.0);
        assert_eq!(value_axis_max(&[mean("a", f64::NAN)]), 1.0);
        assert_eq!(value_axis_max(&[mean("a", 0.0)]), 1.0);
    }

    #[test]
    fn export_into_unwritable_dir_fails_with_io() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let summary = empty_summary();
        let err = StaticChartRenderer::export(&summary, &blocker.path().join("out"), 100, 100);
        assert!(matches!(err, Err(RenderError::Io { .. })));
    }

    #[test]
    fn export_writes_every_view_and_the_summary() {
        let summary = DashboardSummary {
            kpis: crate::stats::Kpis {
                rows: 3,
                total: 370,
                mean: 370.0 / 3.0,
                max: Some(235),
            },
            by_season: vec![mean("spring", 16.0), mean("fall", 235.0)],
            by_hour: vec![mean("0", 16.0), mean("13", 235.0), mean("18", 119.0)],
            by_working_day: vec![mean("Non-working", 125.5), mean("Working", 119.0)],
            by_month: vec![mean("jan", 16.0), mean("jul", 235.0)],
            by_weather: vec![mean("1", 125.5), mean("3", 119.0)],
            correlation: CorrelationMatrix {
                columns: vec!["temp".to_string(), "count".to_string()],
                values: vec![vec![1.0, 0.62], vec![0.62, 1.0]],
            },
        };
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");

        let report = StaticChartRenderer::export(&summary, &out, 300, 200).unwrap();

        let names: Vec<String> = report
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "season.png",
                "hour.png",
                "working_day.png",
                "month.png",
                "weather.png",
                "correlation.png",
                "summary.json",
            ]
        );

        for png in report.files.iter().filter(|p| p.extension().is_some_and(|e| e == "png")) {
            let image = image::open(png).unwrap();
            assert_eq!((image.width(), image.height()), (300, 200), "{}", png.display());
        }

        let json: serde_json::Value =
            serde_json::from_reader(File::open(out.join("summary.json")).unwrap()).unwrap();
        assert_eq!(json["kpis"]["total"], 370);
        assert_eq!(json["by_season"][1]["label"], "fall");
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        let summary = empty_summary();
        let err = StaticChartRenderer::render_view_png(&summary, ChartView::Season, 0, 10);
        assert!(matches!(err, Err(RenderError::Size(0, 10))));
    }
}
