use serde::{Deserialize, Serialize};

pub const DEFAULT_TICKER: &str = "005930.KS";
pub const DEFAULT_BENCHMARK: &str = "SPY";
pub const DEFAULT_LOOKBACK_YEARS: u32 = 3;
pub const MIN_LOOKBACK_YEARS: u32 = 1;
pub const MAX_LOOKBACK_YEARS: u32 = 10;

/// One user interaction's worth of input. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub benchmark: Option<String>,
    pub lookback_years: u32,
}

impl AnalysisRequest {
    pub fn new(ticker: &str, benchmark: Option<&str>, lookback_years: u32) -> Self {
        let benchmark = benchmark
            .map(normalize_symbol)
            .filter(|s| !s.is_empty());

        Self {
            ticker: normalize_symbol(ticker),
            benchmark,
            lookback_years: lookback_years.clamp(MIN_LOOKBACK_YEARS, MAX_LOOKBACK_YEARS),
        }
    }

    /// An empty ticker means the user has not asked for anything yet.
    pub fn is_ready(&self) -> bool {
        !self.ticker.is_empty()
    }

    /// Provider period string, e.g. `3y`.
    pub fn period(&self) -> String {
        format!("{}y", self.lookback_years)
    }

    pub fn report_title(&self) -> String {
        match &self.benchmark {
            Some(b) => format!("{} vs {}", self.ticker, b),
            None => format!("{} Analysis", self.ticker),
        }
    }
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self::new(DEFAULT_TICKER, Some(DEFAULT_BENCHMARK), DEFAULT_LOOKBACK_YEARS)
    }
}

fn normalize_symbol(s: &str) -> String {
    s.trim().to_uppercase()
}
