use super::{ensure_len, StatsResult};
use crate::domain::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Drawdown from the running peak at each date. The equity curve starts at
/// 1.0 before the first return, so a loss on day one already counts.
pub fn drawdown_series(series: &ReturnSeries) -> Vec<(NaiveDate, f64)> {
    let mut equity = 1.0_f64;
    let mut peak = 1.0_f64;
    series
        .points
        .iter()
        .map(|p| {
            equity *= 1.0 + p.value;
            peak = peak.max(equity);
            (p.date, equity / peak - 1.0)
        })
        .collect()
}

/// Largest peak-to-trough fall, as a non-positive fraction.
pub fn max_drawdown(series: &ReturnSeries) -> StatsResult<f64> {
    ensure_len(&series.values(), 1, "max drawdown")?;
    Ok(drawdown_series(series)
        .into_iter()
        .map(|(_, dd)| dd)
        .fold(0.0, f64::min))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    pub start: NaiveDate,
    pub valley: NaiveDate,
    pub end: NaiveDate,
    pub recovered: bool,
    pub days: i64,
    pub max_drawdown: f64,
}

/// Contiguous underwater stretches in date order. An unrecovered period ends
/// on the last date of the series.
pub fn drawdown_periods(series: &ReturnSeries) -> Vec<DrawdownPeriod> {
    let mut out = Vec::new();
    let mut open: Option<DrawdownPeriod> = None;

    for (date, dd) in drawdown_series(series) {
        let underwater = dd < 0.0;
        match open.take() {
            Some(mut period) => {
                period.end = date;
                if underwater {
                    if dd < period.max_drawdown {
                        period.max_drawdown = dd;
                        period.valley = date;
                    }
                    open = Some(period);
                } else {
                    period.recovered = true;
                    out.push(finish(period));
                }
            }
            None if underwater => {
                open = Some(DrawdownPeriod {
                    start: date,
                    valley: date,
                    end: date,
                    recovered: false,
                    days: 1,
                    max_drawdown: dd,
                });
            }
            None => {}
        }
    }

    if let Some(period) = open {
        out.push(finish(period));
    }
    out
}

fn finish(mut period: DrawdownPeriod) -> DrawdownPeriod {
    period.days = (period.end - period.start).num_days() + 1;
    period
}

/// The `n` deepest periods, deepest first.
pub fn worst_periods(periods: &[DrawdownPeriod], n: usize) -> Vec<DrawdownPeriod> {
    let mut sorted = periods.to_vec();
    sorted.sort_by(|a, b| a.max_drawdown.total_cmp(&b.max_drawdown));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::d;
    use crate::domain::ReturnPoint;
    use crate::stats::assert_close;

    fn series(values: &[f64]) -> ReturnSeries {
        let start = d(2025, 3, 1);
        ReturnSeries::new(
            "T",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| ReturnPoint {
                    date: start + chrono::Duration::days(i as i64),
                    value: *v,
                })
                .collect(),
        )
    }

    #[test]
    fn max_drawdown_from_running_peak() {
        // 1.0 -> 1.1 -> 0.88 -> 0.968 -> 1.1616
        let s = series(&[0.1, -0.2, 0.1, 0.2]);
        assert_close(max_drawdown(&s).unwrap(), -0.2, 1e-12);
    }

    #[test]
    fn first_day_loss_counts() {
        let s = series(&[-0.1, 0.05]);
        assert_close(max_drawdown(&s).unwrap(), -0.1, 1e-12);
    }

    #[test]
    fn rising_series_has_zero_drawdown_and_no_periods() {
        let s = series(&[0.01, 0.02, 0.0]);
        assert_eq!(max_drawdown(&s).unwrap(), 0.0);
        assert!(drawdown_periods(&s).is_empty());
    }

    #[test]
    fn periods_track_valley_and_recovery() {
        let s = series(&[0.1, -0.2, -0.1, 0.5, -0.05]);
        let periods = drawdown_periods(&s);
        assert_eq!(periods.len(), 2);

        let first = periods[0];
        assert_eq!(first.start, d(2025, 3, 2));
        assert_eq!(first.valley, d(2025, 3, 3));
        assert_eq!(first.end, d(2025, 3, 4));
        assert!(first.recovered);
        assert_eq!(first.days, 3);
        assert_close(first.max_drawdown, 0.8 * 0.9 - 1.0, 1e-12);

        let second = periods[1];
        assert!(!second.recovered);
        assert_eq!(second.days, 1);

        let worst = worst_periods(&periods, 1);
        assert_eq!(worst, vec![first]);
    }

    #[test]
    fn empty_series_is_an_error() {
        assert!(max_drawdown(&ReturnSeries::empty("T")).is_err());
    }
}
