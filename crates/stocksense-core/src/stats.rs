//! Statistics primitives
//!
//! Small, pure numeric helpers shared by the analyzers: mean, population
//! standard deviation, and a simple linear regression over a uniformly spaced
//! series (x is the zero-based index). Nothing here is inferential; the
//! engine uses descriptive statistics only.

use crate::error::{Error, Result};

/// Best-fit line and goodness of fit for a time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 1 − SS_res/SS_tot.
    /// A constant series is trivially perfectly explained, so SS_tot = 0
    /// yields 1.0.
    pub r_squared: f64,
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divide by n, not n − 1).
///
/// A single-element series has no spread and returns 0.
pub fn stddev(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    if values.len() == 1 {
        return Ok(0.0);
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Simple linear regression with the zero-based index as the independent
/// variable.
///
/// Requires at least 2 points.
pub fn linear_regression(values: &[f64]) -> Result<Regression> {
    if values.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: values.len(),
        });
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_tot: f64 = values.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let predicted = slope * i as f64 + intercept;
            (y - predicted).powi(2)
        })
        .sum();

    let r_squared = if ss_tot > 0.0 {
        1.0 - (ss_res / ss_tot)
    } else {
        1.0
    };

    Ok(Regression {
        slope,
        intercept,
        r_squared,
    })
}
