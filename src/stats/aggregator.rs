//! Aggregator Module
//! KPIs and grouped means over the filtered rentals.

use crate::data::calendar::{Season, MONTH_NAMES, WORKING_DAY_LABELS};
use crate::data::i64_values;
use crate::stats::{CorrelationMatrix, StatsError};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub rows: usize,
    pub total: i64,
    /// NaN when no rows are selected.
    pub mean: f64,
    pub max: Option<i64>,
}

impl Kpis {
    pub fn compute(df: &DataFrame) -> Result<Self, StatsError> {
        let counts: Vec<i64> = i64_values(df, "count")?.into_iter().flatten().collect();
        let as_f64: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

        Ok(Self {
            rows: counts.len(),
            total: counts.iter().sum(),
            mean: statrs::statistics::Statistics::mean(as_f64.iter()),
            max: counts.iter().copied().max(),
        })
    }
}

/// Mean hourly rentals for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub label: String,
    pub mean: f64,
    pub rows: usize,
}

/// The six summary views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartView {
    Season,
    Hour,
    WorkingDay,
    Month,
    Weather,
    Correlation,
}

/// How a view is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Heatmap,
}

impl ChartView {
    pub const ALL: [ChartView; 6] = [
        ChartView::Season,
        ChartView::Hour,
        ChartView::WorkingDay,
        ChartView::Month,
        ChartView::Weather,
        ChartView::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartView::Season => "Mean Hourly Rentals by Season",
            ChartView::Hour => "Mean Hourly Rentals by Hour of Day",
            ChartView::WorkingDay => "Working vs Non-working Day Rentals",
            ChartView::Month => "Mean Hourly Rentals by Month",
            ChartView::Weather => "Mean Rentals by Weather Category",
            ChartView::Correlation => "Correlation Heatmap",
        }
    }

    pub fn x_label(self) -> &'static str {
        match self {
            ChartView::Season => "season",
            ChartView::Hour => "hour",
            ChartView::WorkingDay => "day_type",
            ChartView::Month => "month",
            ChartView::Weather => "weather",
            ChartView::Correlation => "",
        }
    }

    /// Base name used for exported files.
    pub fn file_stem(self) -> &'static str {
        match self {
            ChartView::Season => "season",
            ChartView::Hour => "hour",
            ChartView::WorkingDay => "working_day",
            ChartView::Month => "month",
            ChartView::Weather => "weather",
            ChartView::Correlation => "correlation",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            ChartView::Season | ChartView::WorkingDay | ChartView::Weather => ChartKind::Bar,
            ChartView::Hour | ChartView::Month => ChartKind::Line,
            ChartView::Correlation => ChartKind::Heatmap,
        }
    }
}

/// Everything the dashboard shows for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub by_season: Vec<CategoryMean>,
    pub by_hour: Vec<CategoryMean>,
    pub by_working_day: Vec<CategoryMean>,
    pub by_month: Vec<CategoryMean>,
    pub by_weather: Vec<CategoryMean>,
    pub correlation: CorrelationMatrix,
}

impl DashboardSummary {
    /// Aggregate the filtered rows. `numeric_columns` feeds the correlation view.
    pub fn compute(df: &DataFrame, numeric_columns: &[String]) -> Result<Self, StatsError> {
        let kpis = Kpis::compute(df)?;

        let seasons = StatsCalculator::grouped_means(df, "season")?;
        let by_season = StatsCalculator::in_order(
            &seasons,
            Season::ALL.iter().map(|s| (s.label().to_string(), s.label().to_string())),
        );

        let hours = StatsCalculator::grouped_means(df, "hour")?;
        let by_hour = StatsCalculator::in_numeric_order(&hours);

        let working = StatsCalculator::grouped_means(df, "workingday")?;
        let by_working_day = StatsCalculator::in_order(
            &working,
            WORKING_DAY_LABELS
                .iter()
                .enumerate()
                .map(|(flag, label)| (flag.to_string(), label.to_string())),
        );

        let months = StatsCalculator::grouped_means(df, "month")?;
        let by_month = StatsCalculator::in_order(
            &months,
            MONTH_NAMES.iter().map(|m| (m.to_string(), m.to_string())),
        );

        let weather = StatsCalculator::grouped_means(df, "weather")?;
        let by_weather = StatsCalculator::in_numeric_order(&weather);

        let correlation = CorrelationMatrix::compute(df, numeric_columns)?;

        debug!(
            rows = kpis.rows,
            seasons = by_season.len(),
            hours = by_hour.len(),
            "summary computed"
        );

        Ok(Self {
            kpis,
            by_season,
            by_hour,
            by_working_day,
            by_month,
            by_weather,
            correlation,
        })
    }

    /// Category series behind a view; `None` for the heatmap.
    pub fn series(&self, view: ChartView) -> Option<&[CategoryMean]> {
        match view {
            ChartView::Season => Some(&self.by_season),
            ChartView::Hour => Some(&self.by_hour),
            ChartView::WorkingDay => Some(&self.by_working_day),
            ChartView::Month => Some(&self.by_month),
            ChartView::Weather => Some(&self.by_weather),
            ChartView::Correlation => None,
        }
    }
}

/// Grouped mean (and row count) of `count`, keyed by the group's text value.
type GroupTable = HashMap<String, (f64, usize)>;

/// Group-and-aggregate helpers built on Polars lazy queries.
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn grouped_means(df: &DataFrame, key: &str) -> Result<GroupTable, StatsError> {
        let grouped = df
            .clone()
            .lazy()
            .group_by([col(key)])
            .agg([
                col("count").cast(DataType::Float64).mean().alias("mean"),
                col("count").count().alias("rows"),
            ])
            .collect()?;

        let keys = grouped.column(key)?.as_materialized_series().clone();
        let means = grouped.column("mean")?.cast(&DataType::Float64)?;
        let rows = grouped.column("rows")?.cast(&DataType::Int64)?;

        let table = (0..grouped.height())
            .filter_map(|i| {
                let k = keys.get(i).ok()?;
                if k.is_null() {
                    return None;
                }
                let mean = means.f64().ok()?.get(i)?;
                let n = rows.i64().ok()?.get(i)?;
                Some((
                    k.to_string().trim_matches('"').to_string(),
                    (mean, n as usize),
                ))
            })
            .collect();

        Ok(table)
    }

    /// Emit groups in a fixed order as `(key, label)` pairs. Absent groups are skipped.
    pub fn in_order(
        table: &GroupTable,
        order: impl IntoIterator<Item = (String, String)>,
    ) -> Vec<CategoryMean> {
        order
            .into_iter()
            .filter_map(|(key, label)| {
                table.get(&key).map(|&(mean, rows)| CategoryMean { label, mean, rows })
            })
            .collect()
    }

    /// Emit groups sorted by their numeric key.
    pub fn in_numeric_order(table: &GroupTable) -> Vec<CategoryMean> {
        let mut keyed: Vec<(i64, &String, &(f64, usize))> = table
            .iter()
            .filter_map(|(k, v)| Some((k.parse::<i64>().ok()?, k, v)))
            .collect();
        keyed.sort_by_key(|(n, _, _)| *n);
        keyed
            .into_iter()
            .map(|(_, k, &(mean, rows))| CategoryMean {
                label: k.clone(),
                mean,
                rows,
            })
            .collect()
    }
}
