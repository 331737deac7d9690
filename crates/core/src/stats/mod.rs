//! Performance statistics over daily simple returns.
//!
//! Every function is a pure calculation. Annualised figures assume 252
//! trading days and a zero risk-free rate.

pub mod benchmark;
pub mod drawdown;
pub mod returns;
pub mod risk;
pub mod summary;

pub use benchmark::{align, BenchmarkStats};
pub use drawdown::{drawdown_periods, drawdown_series, max_drawdown, DrawdownPeriod};
pub use returns::{cagr, comp, monthly_returns, yearly_returns, PeriodReturn};
pub use risk::{sharpe, sortino, volatility};
pub use summary::PerformanceSummary;

use thiserror::Error;

pub const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("not enough data for {metric}: need at least {needed} observations, got {got}")]
    NotEnoughData {
        metric: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

pub type StatsResult<T> = Result<T, StatsError>;

pub(crate) fn ensure_len(values: &[f64], needed: usize, metric: &'static str) -> StatsResult<()> {
    if values.len() < needed {
        return Err(StatsError::NotEnoughData {
            metric,
            needed,
            got: values.len(),
        });
    }
    Ok(())
}

pub(crate) fn finite(value: f64, metric: &'static str) -> StatsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatsError::NonFinite(metric))
    }
}

pub(crate) fn divide(num: f64, den: f64, metric: &'static str) -> StatsResult<f64> {
    if den == 0.0 {
        return Err(StatsError::DivisionByZero(metric));
    }
    finite(num / den, metric)
}

pub fn mean(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 1, "mean")?;
    finite(values.iter().sum::<f64>() / values.len() as f64, "mean")
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 2, "standard deviation")?;
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / (values.len() - 1) as f64).sqrt(), "standard deviation")
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}
