//! Filter Evaluator Module
//! Turns the sidebar selections into a row predicate over the dataset.

use crate::data::calendar::Season;
use crate::data::loader::{i64_values, RentalDataset};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unknown working day filter: {0}")]
    UnknownWorkingDay(String),
}

/// Tri-state working-day choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkingDayFilter {
    #[default]
    Both,
    WorkingOnly,
    NonWorkingOnly,
}

impl WorkingDayFilter {
    pub const ALL: [WorkingDayFilter; 3] = [
        WorkingDayFilter::Both,
        WorkingDayFilter::WorkingOnly,
        WorkingDayFilter::NonWorkingOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WorkingDayFilter::Both => "Both",
            WorkingDayFilter::WorkingOnly => "Working Day Only",
            WorkingDayFilter::NonWorkingOnly => "Non-working Day Only",
        }
    }

    /// Whether a row with this working-day flag passes.
    pub fn accepts(self, flag: Option<i64>) -> bool {
        match self {
            WorkingDayFilter::Both => true,
            WorkingDayFilter::WorkingOnly => flag == Some(1),
            WorkingDayFilter::NonWorkingOnly => flag == Some(0),
        }
    }
}

impl fmt::Display for WorkingDayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WorkingDayFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(WorkingDayFilter::Both),
            "working" | "working day only" => Ok(WorkingDayFilter::WorkingOnly),
            "non-working" | "nonworking" | "non-working day only" => {
                Ok(WorkingDayFilter::NonWorkingOnly)
            }
            _ => Err(FilterError::UnknownWorkingDay(s.to_string())),
        }
    }
}

/// The user's current filter selections. All predicates are combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub seasons: BTreeSet<Season>,
    pub working_day: WorkingDayFilter,
}

impl FilterSelection {
    /// Every year and season in the dataset, both kinds of day.
    pub fn all(dataset: &RentalDataset) -> Self {
        Self {
            years: dataset.years().iter().copied().collect(),
            seasons: dataset.seasons().iter().copied().collect(),
            working_day: WorkingDayFilter::Both,
        }
    }

    /// Whether one row passes the selection.
    pub fn matches(&self, year: Option<i64>, season: Option<Season>, working_day: Option<i64>) -> bool {
        let year_ok = year
            .and_then(|y| i32::try_from(y).ok())
            .is_some_and(|y| self.years.contains(&y));
        let season_ok = season.is_some_and(|s| self.seasons.contains(&s));
        year_ok && season_ok && self.working_day.accepts(working_day)
    }

    /// Rows of the dataset satisfying every selection, in original order.
    pub fn apply(&self, dataset: &RentalDataset) -> Result<DataFrame, FilterError> {
        let df = dataset.dataframe();
        let years = i64_values(df, "year")?;
        let working = i64_values(df, "workingday")?;
        let season_col = df.column("season")?.cast(&DataType::String)?;

        let mask: Vec<bool> = season_col
            .str()?
            .into_iter()
            .zip(years)
            .zip(working)
            .map(|((season, year), wd)| {
                self.matches(year, season.and_then(Season::from_label), wd)
            })
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask);
        let filtered = df.filter(&mask)?;
        debug!(
            selected = filtered.height(),
            total = df.height(),
            working_day = %self.working_day,
            "filter applied"
        );
        Ok(filtered)
    }
}
