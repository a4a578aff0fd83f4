//! Rental Data Loader Module
//! Loads the rental CSV with Polars and derives the calendar columns once.

use crate::data::calendar::{parse_timestamp, CalendarParts, Season};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns the dashboard cannot work without.
pub const REQUIRED_COLUMNS: [&str; 5] = ["datetime", "season", "weather", "workingday", "count"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: cannot parse timestamp {value:?}")]
    Timestamp { row: usize, value: String },
    #[error("Row {row}: unknown season code {code}")]
    UnknownSeason { row: usize, code: String },
}

/// Read a column as nullable `i64` values, casting when needed.
pub(crate) fn i64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Read a column as nullable `f64` values, casting when needed.
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// The loaded dataset plus the metadata the filters and views need.
#[derive(Debug, Clone)]
pub struct RentalDataset {
    df: DataFrame,
    numeric_columns: Vec<String>,
    years: Vec<i32>,
    seasons: Vec<Season>,
    source: Option<PathBuf>,
}

impl RentalDataset {
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct seasons present, in season order.
    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Numeric columns of the source file (after season labelling).
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Loads and prepares the rental CSV.
pub struct RentalLoader;

impl RentalLoader {
    /// Load a CSV file using Polars and derive the calendar columns.
    pub fn load_csv(path: &Path) -> Result<RentalDataset, LoaderError> {
        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "loading rental data");

        let df = LazyCsvReader::new(&path_str)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let mut dataset = Self::prepare(df)?;
        dataset.source = Some(path.to_path_buf());
        info!(
            rows = dataset.row_count(),
            years = ?dataset.years,
            "rental data ready"
        );
        Ok(dataset)
    }

    /// Derive calendar columns from an already-parsed frame.
    pub fn prepare(mut df: DataFrame) -> Result<RentalDataset, LoaderError> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(LoaderError::MissingColumn(name.to_string()));
            }
        }

        let n = df.height();
        let mut years: Vec<i32> = Vec::with_capacity(n);
        let mut months: Vec<&str> = Vec::with_capacity(n);
        let mut weekdays: Vec<&str> = Vec::with_capacity(n);
        let mut hours: Vec<i32> = Vec::with_capacity(n);
        let mut periods: Vec<&str> = Vec::with_capacity(n);

        let timestamps = df.column("datetime")?.cast(&DataType::String)?;
        for (row, value) in timestamps.str()?.into_iter().enumerate() {
            let parsed = value.and_then(parse_timestamp).ok_or_else(|| {
                LoaderError::Timestamp {
                    row,
                    value: value.unwrap_or("null").to_string(),
                }
            })?;
            let parts = CalendarParts::from_timestamp(&parsed);
            years.push(parts.year);
            months.push(parts.month);
            weekdays.push(parts.day_of_week);
            hours.push(parts.hour);
            periods.push(parts.day_period);
        }

        let mut seasons: Vec<&str> = Vec::with_capacity(n);
        let mut present: BTreeSet<Season> = BTreeSet::new();
        for (row, code) in i64_values(&df, "season")?.into_iter().enumerate() {
            let season = code.and_then(Season::from_code).ok_or_else(|| {
                LoaderError::UnknownSeason {
                    row,
                    code: code.map(|c| c.to_string()).unwrap_or_else(|| "null".into()),
                }
            })?;
            present.insert(season);
            seasons.push(season.label());
        }

        // Normalise the integer columns so downstream code can read them as i64
        for name in ["workingday", "weather", "count"] {
            let cast = df.column(name)?.cast(&DataType::Int64)?;
            df.with_column(cast)?;
        }
        df.with_column(Column::new("season".into(), seasons))?;

        let numeric_columns = numeric_column_names(&df);
        debug!(columns = ?numeric_columns, "numeric columns");

        df.with_column(Column::new("year".into(), years.clone()))?;
        df.with_column(Column::new("month".into(), months))?;
        df.with_column(Column::new("day_of_the_week".into(), weekdays))?;
        df.with_column(Column::new("hour".into(), hours))?;
        df.with_column(Column::new("day_period".into(), periods))?;

        let years: Vec<i32> = years
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(RentalDataset {
            df,
            numeric_columns,
            years,
            seasons: present.into_iter().collect(),
            source: None,
        })
    }
}

fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            matches!(
                col.dtype(),
                DataType::Float32
                    | DataType::Float64
                    | DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
            )
        })
        .map(|col| col.name().to_string())
        .collect()
}
