//! Data module - CSV loading, calendar derivation and filtering

pub mod calendar;
mod filter;
mod loader;

pub use calendar::{DayPeriod, Season};
pub use filter::{FilterError, FilterSelection, WorkingDayFilter};
pub use loader::{LoaderError, RentalDataset, RentalLoader, REQUIRED_COLUMNS};
pub(crate) use loader::{f64_values, i64_values};
