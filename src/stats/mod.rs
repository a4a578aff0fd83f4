//! Statistics module - KPIs, grouped means and correlation

mod aggregator;
mod correlation;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use aggregator::{
    CategoryMean, ChartKind, ChartView, DashboardSummary, Kpis, StatsCalculator,
};
pub use correlation::{pearson, CorrelationMatrix};

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}
