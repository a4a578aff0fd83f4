//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{ExportReport, RenderError, StaticChartRenderer};

/// Placeholder shown for values that do not exist (empty selection).
pub const MISSING: &str = "–";

/// Bar / line colour for the single-series views.
pub const SERIES_RGB: [u8; 3] = [52, 152, 219];

/// Per-category colours, cycled.
pub const PALETTE_RGB: [[u8; 3]; 10] = [
    [52, 152, 219],  // Blue
    [231, 76, 60],   // Red
    [46, 204, 113],  // Green
    [155, 89, 182],  // Purple
    [243, 156, 18],  // Orange
    [26, 188, 156],  // Teal
    [233, 30, 99],   // Pink
    [0, 188, 212],   // Cyan
    [255, 87, 34],   // Deep Orange
    [96, 125, 139],  // Blue Grey
];

const COOL: [f64; 3] = [59.0, 76.0, 192.0];
const NEUTRAL: [f64; 3] = [221.0, 221.0, 221.0];
const WARM: [f64; 3] = [180.0, 4.0, 38.0];
const NAN_RGB: [u8; 3] = [160, 160, 160];

/// Diverging blue-white-red colour for a correlation in [-1, 1].
pub fn coolwarm(value: f64) -> [u8; 3] {
    if value.is_nan() {
        return NAN_RGB;
    }
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (COOL, NEUTRAL, v + 1.0)
    } else {
        (NEUTRAL, WARM, v)
    };
    let mix = |i: usize| (from[i] + (to[i] - from[i]) * t).round() as u8;
    [mix(0), mix(1), mix(2)]
}

/// Text colour readable on top of `coolwarm(value)`.
pub fn heatmap_text_is_light(value: f64) -> bool {
    !value.is_nan() && value.abs() > 0.6
}

pub fn palette(index: usize) -> [u8; 3] {
    PALETTE_RGB[index % PALETTE_RGB.len()]
}

pub fn format_total(total: i64) -> String {
    total.to_string()
}

pub fn format_mean(mean: f64) -> String {
    if mean.is_nan() {
        MISSING.to_string()
    } else {
        format!("{:.2}", mean)
    }
}

pub fn format_max(max: Option<i64>) -> String {
    max.map(|m| m.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn format_correlation(value: f64) -> String {
    if value.is_nan() {
        MISSING.to_string()
    } else {
        format!("{:.2}", value)
    }
}
