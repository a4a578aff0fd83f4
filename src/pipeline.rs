//! Filter-then-aggregate pipeline shared by the window and headless export.

use crate::data::{FilterError, FilterSelection, RentalDataset};
use crate::stats::{DashboardSummary, StatsError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Apply `selection` to the dataset and aggregate what remains.
pub fn summarize(
    dataset: &RentalDataset,
    selection: &FilterSelection,
) -> Result<DashboardSummary, PipelineError> {
    let filtered = selection.apply(dataset)?;
    let summary = DashboardSummary::compute(&filtered, dataset.numeric_columns())?;
    Ok(summary)
}
