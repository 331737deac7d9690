use crate::domain::{AnalysisRequest, MetricCard, MetricCards, MetricKind, ReturnSeries};
use crate::error::AnalysisError;
use crate::ingest::ReturnsProvider;
use crate::report::{build_report, ReportArtifact};
use crate::stats::{self, StatsResult};
use crate::time::{resolve_window, DateWindow};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// What one pass produced.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// No ticker yet; nothing was fetched.
    AwaitingInput,
    Rendered(Box<AnalysisResult>),
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub request: AnalysisRequest,
    pub window: DateWindow,
    pub subject_points: usize,
    pub benchmark_points: Option<usize>,
    pub metrics: MetricCards,
    /// A failed report leaves the metrics above it intact.
    pub report: Result<ReportArtifact, AnalysisError>,
}

/// Runs one request end to end against a provider.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn ReturnsProvider>,
    report_dir: PathBuf,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn ReturnsProvider>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            report_dir: report_dir.into(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    pub async fn fetch_returns(
        &self,
        ticker: &str,
        period: &str,
    ) -> Result<ReturnSeries, AnalysisError> {
        self.provider
            .fetch_returns(ticker, period)
            .await
            .map_err(|e| AnalysisError::Unclassified(e.context(format!("fetching '{ticker}' failed"))))
    }

    pub async fn run(
        &self,
        request: &AnalysisRequest,
        now_utc: DateTime<Utc>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if !request.is_ready() {
            return Ok(AnalysisOutcome::AwaitingInput);
        }

        let window = resolve_window(request.lookback_years, now_utc);
        let period = request.period();
        tracing::info!(
            ticker = %request.ticker,
            benchmark = ?request.benchmark,
            %period,
            start = %window.start.date_naive(),
            end = %window.end.date_naive(),
            "analysis started"
        );

        let subject = self.fetch_returns(&request.ticker, &period).await?;
        let benchmark = match &request.benchmark {
            Some(b) => Some(self.fetch_returns(b, &period).await?),
            None => None,
        };

        if subject.is_empty() {
            tracing::warn!(ticker = %request.ticker, "no data for ticker");
            return Err(AnalysisError::DataNotFound {
                ticker: request.ticker.clone(),
            });
        }

        let metrics = compute_metrics(&subject);
        if let Some(warning) = &metrics.warning {
            tracing::warn!(ticker = %request.ticker, %warning, "metric computation partially failed");
        }

        let subject_points = subject.len();
        let benchmark_points = benchmark.as_ref().map(ReturnSeries::len);
        let title = request.report_title();
        let dir = self.report_dir.clone();
        let report = tokio::task::spawn_blocking(move || {
            build_report(&subject, benchmark.as_ref(), &title, &dir)
        })
        .await
        .unwrap_or_else(|e| Err(AnalysisError::ReportGeneration(format!("report task failed: {e}"))));

        match &report {
            Ok(artifact) => tracing::info!(
                ticker = %request.ticker,
                bytes = artifact.len(),
                cards = metrics.cards.len(),
                "analysis finished"
            ),
            Err(e) => tracing::warn!(ticker = %request.ticker, error = %e, "report generation failed"),
        }

        Ok(AnalysisOutcome::Rendered(Box::new(AnalysisResult {
            request: request.clone(),
            window,
            subject_points,
            benchmark_points,
            metrics,
            report,
        })))
    }
}

/// Computes the four headline metrics independently. Each success becomes a
/// card; all failures are folded into a single warning.
pub fn compute_metrics(series: &ReturnSeries) -> MetricCards {
    let values = series.values();
    let mut cards = Vec::with_capacity(MetricKind::ALL.len());
    let mut failures = Vec::new();

    for kind in MetricKind::ALL {
        let value: StatsResult<f64> = match kind {
            MetricKind::Cagr => stats::cagr(series),
            MetricKind::Sharpe => stats::sharpe(&values),
            MetricKind::MaxDrawdown => stats::max_drawdown(series),
            MetricKind::Volatility => stats::volatility(&values),
        };
        match value {
            Ok(v) => cards.push(MetricCard::new(kind, v)),
            Err(e) => failures.push(format!("{}: {e}", kind.label())),
        }
    }

    let warning = (!failures.is_empty())
        .then(|| AnalysisError::MetricComputation(failures.join("; ")).to_string());

    MetricCards { cards, warning }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::fixtures::{d, synthetic};
    use crate::domain::ReturnPoint;
    use crate::ingest::cache::tests::CountingProvider;
    use crate::ingest::CachedReturnsProvider;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap()
    }

    struct FixedProvider(HashMap<&'static str, ReturnSeries>);

    #[async_trait::async_trait]
    impl ReturnsProvider for FixedProvider {
        fn provider_name(&self) -> &'static str {
            "fixed_stub"
        }

        async fn fetch_returns(&self, ticker: &str, _period: &str) -> anyhow::Result<ReturnSeries> {
            Ok(self
                .0
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| ReturnSeries::empty(ticker)))
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl ReturnsProvider for FailingProvider {
        fn provider_name(&self) -> &'static str {
            "failing_stub"
        }

        async fn fetch_returns(&self, _ticker: &str, _period: &str) -> anyhow::Result<ReturnSeries> {
            anyhow::bail!("connection refused")
        }
    }

    fn rendered(outcome: AnalysisOutcome) -> AnalysisResult {
        match outcome {
            AnalysisOutcome::Rendered(r) => *r,
            AnalysisOutcome::AwaitingInput => panic!("expected a rendered result"),
        }
    }

    #[tokio::test]
    async fn aapl_against_spy_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(CountingProvider::default());
        let analyzer = Analyzer::new(provider.clone(), dir.path());

        let req = AnalysisRequest::new("AAPL", Some("SPY"), 1);
        let result = rendered(analyzer.run(&req, now()).await.unwrap());

        assert!((result.window.days() - 365).abs() <= 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(result.subject_points > 0);
        assert!(result.benchmark_points.unwrap() > 0);

        let snap = result.metrics.snapshot().expect("all four metrics");
        for v in [snap.cagr, snap.sharpe, snap.max_drawdown, snap.volatility] {
            assert!(v.is_finite());
        }
        assert!(result.metrics.warning.is_none());

        let report = result.report.unwrap();
        assert!(report.len() > 0);
        assert!(std::fs::metadata(report.path()).unwrap().len() > 0);
        assert_eq!(report.download_filename(), "AAPL_report.html");
        assert_eq!(report.title(), "AAPL vs SPY");
    }

    #[tokio::test]
    async fn empty_ticker_fetches_nothing() {
        let provider = Arc::new(CountingProvider::default());
        let analyzer = Analyzer::new(provider.clone(), std::env::temp_dir());

        let req = AnalysisRequest::new("", Some("SPY"), 3);
        let outcome = analyzer.run(&req, now()).await.unwrap();

        assert!(matches!(outcome, AnalysisOutcome::AwaitingInput));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_ticker_is_data_not_found() {
        let analyzer = Analyzer::new(Arc::new(CountingProvider::default()), std::env::temp_dir());

        let req = AnalysisRequest::new("ZZZZZZ9.INVALID", None, 1);
        let err = analyzer.run(&req, now()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::DataNotFound { ticker } if ticker == "ZZZZZZ9.INVALID"));
    }

    #[tokio::test]
    async fn provider_failure_is_unclassified() {
        let analyzer = Analyzer::new(Arc::new(FailingProvider), std::env::temp_dir());

        let err = analyzer
            .run(&AnalysisRequest::new("AAPL", None, 1), now())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "unclassified");
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[tokio::test]
    async fn no_benchmark_titles_report_with_subject_only() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = Analyzer::new(Arc::new(CountingProvider::default()), dir.path());

        let req = AnalysisRequest::new("AAPL", Some(""), 1);
        let result = rendered(analyzer.run(&req, now()).await.unwrap());

        assert_eq!(result.benchmark_points, None);
        let report = result.report.unwrap();
        assert_eq!(report.title(), "AAPL Analysis");
        assert!(report.html().contains("<title>AAPL Analysis</title>"));
    }

    #[tokio::test]
    async fn report_failure_keeps_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let mut series = HashMap::new();
        series.insert("AAPL", synthetic("AAPL", d(2025, 1, 2), 200, 0.001));
        series.insert("SPY", synthetic("SPY", d(2019, 1, 2), 200, 0.001));
        let analyzer = Analyzer::new(Arc::new(FixedProvider(series)), dir.path());

        let req = AnalysisRequest::new("AAPL", Some("SPY"), 1);
        let result = rendered(analyzer.run(&req, now()).await.unwrap());

        assert_eq!(result.metrics.cards.len(), 4);
        assert!(matches!(result.report, Err(AnalysisError::ReportGeneration(_))));
    }

    #[tokio::test]
    async fn warm_cache_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let cached = Arc::new(CachedReturnsProvider::new(
            CountingProvider::default(),
            Duration::from_secs(3600),
        ));
        let analyzer = Analyzer::new(cached.clone(), dir.path());
        let req = AnalysisRequest::new("AAPL", Some("SPY"), 1);

        let first = rendered(analyzer.run(&req, now()).await.unwrap()).report.unwrap();
        let second = rendered(analyzer.run(&req, now()).await.unwrap()).report.unwrap();

        assert_eq!(first.html(), second.html());
        assert_ne!(first.path(), second.path());
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_series_gives_one_warning_and_no_cards() {
        let cards = compute_metrics(&ReturnSeries::empty("AAPL"));
        assert!(cards.cards.is_empty());
        let warning = cards.warning.unwrap();
        assert!(warning.starts_with("some metrics could not be computed"));
        assert_eq!(warning.matches("some metrics").count(), 1);
    }

    #[test]
    fn single_point_keeps_the_metrics_that_work() {
        let s = ReturnSeries::new(
            "AAPL",
            vec![ReturnPoint {
                date: d(2025, 1, 2),
                value: -0.03,
            }],
        );
        let cards = compute_metrics(&s);
        assert_eq!(cards.cards.len(), 1);
        assert_eq!(cards.cards[0].kind, MetricKind::MaxDrawdown);
        let warning = cards.warning.unwrap();
        assert!(warning.contains("CAGR"));
        assert!(warning.contains("Sharpe"));
        assert!(warning.contains("Volatility"));
    }
}
