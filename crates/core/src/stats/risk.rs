use super::{divide, ensure_len, finite, mean, std_dev, StatsResult, PERIODS_PER_YEAR};

// One-sided 95% quantile of the standard normal distribution.
const Z_95: f64 = 1.644_853_626_951_472_2;

/// Annualised standard deviation.
pub fn volatility(values: &[f64]) -> StatsResult<f64> {
    finite(std_dev(values)? * PERIODS_PER_YEAR.sqrt(), "volatility")
}

pub fn sharpe(values: &[f64]) -> StatsResult<f64> {
    let m = mean(values)?;
    let sd = std_dev(values)?;
    Ok(divide(m, sd, "Sharpe ratio")? * PERIODS_PER_YEAR.sqrt())
}

/// Like Sharpe, but only downside deviation counts as risk.
pub fn sortino(values: &[f64]) -> StatsResult<f64> {
    let m = mean(values)?;
    let downside = (values.iter().map(|v| v.min(0.0).powi(2)).sum::<f64>()
        / values.len() as f64)
        .sqrt();
    Ok(divide(m, downside, "Sortino ratio")? * PERIODS_PER_YEAR.sqrt())
}

pub fn calmar(cagr: f64, max_drawdown: f64) -> StatsResult<f64> {
    divide(cagr, max_drawdown.abs(), "Calmar ratio")
}

/// Parametric one-day value at risk at 95% confidence.
pub fn value_at_risk(values: &[f64]) -> StatsResult<f64> {
    finite(mean(values)? - Z_95 * std_dev(values)?, "value at risk")
}

/// Bias-adjusted sample skewness.
pub fn skew(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 3, "skew")?;
    let n = values.len() as f64;
    let m = mean(values)?;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    let g1 = divide(m3, m2.powf(1.5), "skew")?;
    finite(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0), "skew")
}

/// Bias-adjusted sample excess kurtosis (0 for a normal distribution).
pub fn kurtosis(values: &[f64]) -> StatsResult<f64> {
    ensure_len(values, 4, "kurtosis")?;
    let n = values.len() as f64;
    let m = mean(values)?;
    let s2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    let sum4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>();
    let scaled = divide(sum4, s2 * s2, "kurtosis")?;
    let a = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let b = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    finite(a * scaled - b, "kurtosis")
}

/// Kelly fraction from the win rate and the average win / average loss ratio.
pub fn kelly(values: &[f64]) -> StatsResult<f64> {
    let wins: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    let losses: Vec<f64> = values.iter().copied().filter(|v| *v < 0.0).collect();
    let avg_win = mean(&wins)?;
    let avg_loss = mean(&losses)?.abs();
    let payoff = divide(avg_win, avg_loss, "Kelly criterion")?;
    let p = wins.len() as f64 / (wins.len() + losses.len()) as f64;
    divide(payoff * p - (1.0 - p), payoff, "Kelly criterion")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{assert_close, StatsError};

    const V: [f64; 6] = [0.01, -0.02, 0.015, 0.003, -0.007, 0.02];

    #[test]
    fn volatility_and_sharpe_annualise() {
        let sd = std_dev(&V).unwrap();
        let m = mean(&V).unwrap();
        assert_close(volatility(&V).unwrap(), sd * 252f64.sqrt(), 1e-12);
        assert_close(sharpe(&V).unwrap(), m / sd * 252f64.sqrt(), 1e-12);
    }

    #[test]
    fn flat_series_has_no_sharpe() {
        assert_eq!(
            sharpe(&[0.25, 0.25, 0.25]),
            Err(StatsError::DivisionByZero("Sharpe ratio"))
        );
    }

    #[test]
    fn sortino_needs_a_losing_day() {
        assert!(sortino(&[0.01, 0.02]).is_err());
        let downside = ((0.02f64.powi(2) + 0.007f64.powi(2)) / 6.0).sqrt();
        assert_close(
            sortino(&V).unwrap(),
            mean(&V).unwrap() / downside * 252f64.sqrt(),
            1e-12,
        );
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        assert_close(skew(&[-2.0, -1.0, 0.0, 1.0, 2.0]).unwrap(), 0.0, 1e-12);
        assert!(skew(&[1.0, 2.0, 4.0, 20.0]).unwrap() > 0.0);
    }

    #[test]
    fn kurtosis_matches_reference_value() {
        // Excess kurtosis of 1..=5 with the unbiased estimator is -1.2.
        assert_close(kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), -1.2, 1e-12);
    }

    #[test]
    fn kelly_from_win_rate_and_payoff() {
        // p = 0.5, payoff = 2 -> (2 * 0.5 - 0.5) / 2 = 0.25
        assert_close(kelly(&[0.02, -0.01, 0.02, -0.01]).unwrap(), 0.25, 1e-12);
    }

    #[test]
    fn calmar_uses_absolute_drawdown() {
        assert_close(calmar(0.1, -0.25).unwrap(), 0.4, 1e-12);
        assert!(calmar(0.1, 0.0).is_err());
    }

    #[test]
    fn var_sits_below_the_mean() {
        assert!(value_at_risk(&V).unwrap() < mean(&V).unwrap());
    }
}
