//! Pairwise Pearson correlation over the numeric columns.

use crate::data::f64_values;
use crate::stats::StatsError;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

/// Square, symmetric correlation matrix.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of `columns` in parallel, one row per task.
    pub fn compute(df: &DataFrame, columns: &[String]) -> Result<Self, StatsError> {
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|name| f64_values(df, name))
            .collect::<PolarsResult<_>>()?;

        let values = (0..data.len())
            .into_par_iter()
            .map(|i| {
                (0..data.len())
                    .map(|j| pearson(&data[i], &data[j]))
                    .collect::<Vec<f64>>()
            })
            .collect();

        Ok(Self {
            columns: columns.to_vec(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }
}

/// Pearson's r over rows where both sides are present.
/// NaN when fewer than two pairs remain or either side is constant.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    use statrs::statistics::Statistics;

    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .unzip();

    if xs.len() < 2 {
        return f64::NAN;
    }

    let sx = xs.iter().std_dev();
    let sy = ys.iter().std_dev();
    if sx == 0.0 || sy == 0.0 {
        return f64::NAN;
    }

    let cov = xs.iter().covariance(ys.iter());
    (cov / (sx * sy)).clamp(-1.0, 1.0)
}
