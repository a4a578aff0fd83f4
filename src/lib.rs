//! Washington D.C. Bike Rentals Dashboard
//!
//! Loads the hourly rental dataset, filters it by year, season and working
//! day, and renders KPIs and six summary charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod pipeline;
pub mod stats;
