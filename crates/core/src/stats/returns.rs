use super::{divide, ensure_len, finite, StatsError, StatsResult};
use crate::domain::ReturnSeries;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;

/// Cumulative compounded return over the whole series.
pub fn comp(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 1, "cumulative return")?;
    finite(
        values.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0,
        "cumulative return",
    )
}

/// Compound annual growth rate; the year count is the calendar span of the
/// series divided by 365.
pub fn cagr(series: &ReturnSeries) -> StatsResult<f64> {
    let values = series.values();
    let total = comp(&values)?;
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Err(StatsError::NotEnoughData {
            metric: "CAGR",
            needed: 1,
            got: 0,
        });
    };
    let years = (last - first).num_days() as f64 / DAYS_PER_YEAR;
    let exponent = divide(1.0, years, "CAGR")?;
    finite((1.0 + total).powf(exponent) - 1.0, "CAGR")
}

/// Geometric mean return per observation.
pub fn expected_return(values: &[f64]) -> StatsResult<f64> {
    let total = comp(values)?;
    finite(
        (1.0 + total).powf(1.0 / values.len() as f64) - 1.0,
        "expected return",
    )
}

pub fn best(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 1, "best return")?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

pub fn worst(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 1, "worst return")?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Share of positive observations among non-zero ones.
pub fn win_rate(values: &[f64]) -> StatsResult<f64> {
    let non_zero = values.iter().filter(|v| **v != 0.0).count();
    let wins = values.iter().filter(|v| **v > 0.0).count();
    divide(wins as f64, non_zero as f64, "win rate")
}

/// A compounded return for one calendar month (`month` set) or year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub year: i32,
    pub month: Option<u32>,
    pub value: f64,
}

pub fn monthly_returns(series: &ReturnSeries) -> Vec<PeriodReturn> {
    bucket(series, |d| (d.year(), Some(d.month())))
}

pub fn yearly_returns(series: &ReturnSeries) -> Vec<PeriodReturn> {
    bucket(series, |d| (d.year(), None))
}

fn bucket(
    series: &ReturnSeries,
    key_of: impl Fn(chrono::NaiveDate) -> (i32, Option<u32>),
) -> Vec<PeriodReturn> {
    let mut out: Vec<PeriodReturn> = Vec::new();
    for p in &series.points {
        let (year, month) = key_of(p.date);
        match out.last_mut() {
            Some(last) if last.year == year && last.month == month => {
                last.value = (1.0 + last.value) * (1.0 + p.value) - 1.0;
            }
            _ => out.push(PeriodReturn {
                year,
                month,
                value: p.value,
            }),
        }
    }
    out
}

pub fn period_values(periods: &[PeriodReturn]) -> Vec<f64> {
    periods.iter().map(|p| p.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::d;
    use crate::domain::ReturnPoint;
    use crate::stats::assert_close;

    fn series(points: &[(chrono::NaiveDate, f64)]) -> ReturnSeries {
        ReturnSeries::new(
            "T",
            points
                .iter()
                .map(|&(date, value)| ReturnPoint { date, value })
                .collect(),
        )
    }

    #[test]
    fn comp_compounds() {
        assert_close(comp(&[0.1, -0.1]).unwrap(), -0.01, 1e-12);
    }

    #[test]
    fn cagr_uses_calendar_span() {
        // +21% over exactly two 365-day years is 10% a year.
        let s = series(&[(d(2023, 1, 1), 0.1), (d(2024, 1, 1), 0.0), (d(2024, 12, 31), 0.1)]);
        assert_close(cagr(&s).unwrap(), 0.1, 1e-12);
    }

    #[test]
    fn cagr_of_single_day_divides_by_zero() {
        let s = series(&[(d(2024, 1, 2), 0.01)]);
        assert_eq!(cagr(&s), Err(StatsError::DivisionByZero("CAGR")));
        assert!(matches!(
            cagr(&ReturnSeries::empty("T")),
            Err(StatsError::NotEnoughData { .. })
        ));
    }

    #[test]
    fn buckets_compound_within_month_and_year() {
        let s = series(&[
            (d(2024, 1, 30), 0.1),
            (d(2024, 1, 31), 0.1),
            (d(2024, 2, 1), -0.5),
            (d(2025, 1, 2), 0.2),
        ]);
        let m = monthly_returns(&s);
        assert_eq!(m.len(), 3);
        assert_eq!((m[0].year, m[0].month), (2024, Some(1)));
        assert_close(m[0].value, 0.21, 1e-12);

        let y = yearly_returns(&s);
        assert_eq!(y.len(), 2);
        assert_close(y[0].value, 1.21 * 0.5 - 1.0, 1e-12);
        assert_close(y[1].value, 0.2, 1e-12);
    }

    #[test]
    fn win_rate_ignores_flat_days() {
        assert_close(win_rate(&[0.1, 0.0, -0.1, 0.2]).unwrap(), 2.0 / 3.0, 1e-12);
        assert!(win_rate(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn best_worst_and_expected() {
        let v = [0.02, -0.03, 0.01];
        assert_eq!(best(&v).unwrap(), 0.02);
        assert_eq!(worst(&v).unwrap(), -0.03);
        let g = expected_return(&[0.1, 0.1]).unwrap();
        assert_close(g, 0.1, 1e-12);
    }
}
