use super::benchmark::BenchmarkStats;
use super::drawdown::{drawdown_periods, max_drawdown};
use super::returns::{
    best, cagr, comp, expected_return, monthly_returns, period_values, win_rate, worst,
    yearly_returns,
};
use super::risk::{calmar, kelly, kurtosis, sharpe, skew, sortino, value_at_risk, volatility};
use crate::domain::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Every statistic the full report shows for one series. A field is `None`
/// when the data cannot support it (too short, flat, no losing days, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub observations: usize,

    pub cumulative_return: Option<f64>,
    pub cagr: Option<f64>,
    pub expected_daily: Option<f64>,
    pub expected_monthly: Option<f64>,
    pub expected_yearly: Option<f64>,
    pub best_day: Option<f64>,
    pub worst_day: Option<f64>,
    pub best_month: Option<f64>,
    pub worst_month: Option<f64>,
    pub best_year: Option<f64>,
    pub worst_year: Option<f64>,
    pub win_days: Option<f64>,
    pub win_months: Option<f64>,
    pub win_years: Option<f64>,

    pub max_drawdown: Option<f64>,
    pub volatility: Option<f64>,
    pub longest_drawdown_days: Option<i64>,
    pub avg_drawdown: Option<f64>,
    pub avg_drawdown_days: Option<f64>,
    pub value_at_risk: Option<f64>,

    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub calmar: Option<f64>,

    pub skew: Option<f64>,
    pub kurtosis: Option<f64>,
    pub kelly: Option<f64>,

    pub relative: Option<BenchmarkStats>,
}

impl PerformanceSummary {
    pub fn compute(series: &ReturnSeries, benchmark: Option<&ReturnSeries>) -> Self {
        let values = series.values();
        let months = period_values(&monthly_returns(series));
        let years = period_values(&yearly_returns(series));
        let periods = drawdown_periods(series);

        let cagr_v = cagr(series).ok();
        let mdd = max_drawdown(series).ok();
        let calmar_v = match (cagr_v, mdd) {
            (Some(c), Some(m)) => calmar(c, m).ok(),
            _ => None,
        };

        let (avg_drawdown, avg_drawdown_days) = if periods.is_empty() {
            (None, None)
        } else {
            let n = periods.len() as f64;
            (
                Some(periods.iter().map(|p| p.max_drawdown).sum::<f64>() / n),
                Some(periods.iter().map(|p| p.days as f64).sum::<f64>() / n),
            )
        };

        Self {
            start_date: series.first_date(),
            end_date: series.last_date(),
            observations: series.len(),

            cumulative_return: comp(&values).ok(),
            cagr: cagr_v,
            expected_daily: expected_return(&values).ok(),
            expected_monthly: expected_return(&months).ok(),
            expected_yearly: expected_return(&years).ok(),
            best_day: best(&values).ok(),
            worst_day: worst(&values).ok(),
            best_month: best(&months).ok(),
            worst_month: worst(&months).ok(),
            best_year: best(&years).ok(),
            worst_year: worst(&years).ok(),
            win_days: win_rate(&values).ok(),
            win_months: win_rate(&months).ok(),
            win_years: win_rate(&years).ok(),

            max_drawdown: mdd,
            volatility: volatility(&values).ok(),
            longest_drawdown_days: periods.iter().map(|p| p.days).max(),
            avg_drawdown,
            avg_drawdown_days,
            value_at_risk: value_at_risk(&values).ok(),

            sharpe: sharpe(&values).ok(),
            sortino: sortino(&values).ok(),
            calmar: calmar_v,

            skew: skew(&values).ok(),
            kurtosis: kurtosis(&values).ok(),
            kelly: kelly(&values).ok(),

            relative: benchmark.and_then(|b| BenchmarkStats::compute(series, b).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::{d, synthetic};

    #[test]
    fn full_summary_for_a_realistic_series() {
        let s = synthetic("AAPL", d(2024, 1, 2), 300, 0.0008);
        let b = synthetic("SPY", d(2024, 1, 2), 300, 0.0003);
        let summary = PerformanceSummary::compute(&s, Some(&b));

        assert_eq!(summary.observations, 300);
        assert_eq!(summary.start_date, Some(d(2024, 1, 2)));
        for v in [
            summary.cumulative_return,
            summary.cagr,
            summary.sharpe,
            summary.sortino,
            summary.max_drawdown,
            summary.volatility,
            summary.value_at_risk,
            summary.skew,
            summary.kurtosis,
            summary.kelly,
            summary.expected_monthly,
        ] {
            assert!(v.is_some_and(f64::is_finite));
        }
        assert!(summary.max_drawdown.unwrap() <= 0.0);
        assert!(summary.longest_drawdown_days.unwrap() >= 1);
        assert!(summary.relative.is_some());
    }

    #[test]
    fn empty_series_yields_an_empty_summary() {
        let summary = PerformanceSummary::compute(&ReturnSeries::empty("X"), None);
        assert_eq!(summary.observations, 0);
        assert_eq!(summary.cagr, None);
        assert_eq!(summary.max_drawdown, None);
        assert_eq!(summary.relative, None);
    }
}
