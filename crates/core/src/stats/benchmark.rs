use super::{divide, ensure_len, mean, std_dev, StatsResult, PERIODS_PER_YEAR};
use crate::domain::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Pairs `(subject, benchmark)` returns on the dates both series share.
/// Markets on different holiday calendars simply lose the unmatched days.
pub fn align(subject: &ReturnSeries, benchmark: &ReturnSeries) -> Vec<(f64, f64)> {
    let (a, b) = (&subject.points, &benchmark.points);
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                out.push((a[i].value, b[j].value));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Relative statistics of a subject against its benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStats {
    pub beta: f64,
    /// Annualised.
    pub alpha: f64,
    pub r_squared: f64,
    pub information_ratio: f64,
    pub correlation: f64,
}

impl BenchmarkStats {
    pub fn compute(subject: &ReturnSeries, benchmark: &ReturnSeries) -> StatsResult<Self> {
        let pairs = align(subject, benchmark);
        let s: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let b: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        ensure_len(&s, 2, "benchmark comparison")?;

        let (ms, mb) = (mean(&s)?, mean(&b)?);
        let cov = pairs
            .iter()
            .map(|(x, y)| (x - ms) * (y - mb))
            .sum::<f64>()
            / (pairs.len() - 1) as f64;
        let (sd_s, sd_b) = (std_dev(&s)?, std_dev(&b)?);

        let beta = divide(cov, sd_b * sd_b, "beta")?;
        let correlation = divide(cov, sd_s * sd_b, "correlation")?;

        let active: Vec<f64> = pairs.iter().map(|(x, y)| x - y).collect();
        let information_ratio = divide(mean(&active)?, std_dev(&active)?, "information ratio")?;

        Ok(Self {
            beta,
            alpha: (ms - beta * mb) * PERIODS_PER_YEAR,
            r_squared: correlation * correlation,
            information_ratio,
            correlation,
        })
    }
}
