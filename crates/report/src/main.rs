use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockperf_core::analysis::{AnalysisOutcome, Analyzer};
use stockperf_core::domain::request::{DEFAULT_BENCHMARK, DEFAULT_LOOKBACK_YEARS, DEFAULT_TICKER};
use stockperf_core::domain::AnalysisRequest;
use stockperf_core::error::AnalysisError;
use stockperf_core::ingest::YahooChartProvider;

#[derive(Debug, Parser)]
#[command(name = "stockperf_report")]
struct Args {
    /// Ticker to analyze, e.g. AAPL or 005930.KS.
    #[arg(long, default_value = DEFAULT_TICKER)]
    ticker: String,

    /// Benchmark to compare against.
    #[arg(long, default_value = DEFAULT_BENCHMARK, conflicts_with = "no_benchmark")]
    benchmark: String,

    /// Skip the benchmark comparison.
    #[arg(long)]
    no_benchmark: bool,

    /// Lookback in years (1-10).
    #[arg(long, default_value_t = DEFAULT_LOOKBACK_YEARS, value_parser = clap::value_parser!(u32).range(1..=10))]
    years: u32,

    /// Where to write `{ticker}_report.html`. Defaults to the current directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockperf_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let benchmark = (!args.no_benchmark).then_some(args.benchmark.as_str());
    let request = AnalysisRequest::new(&args.ticker, benchmark, args.years);
    anyhow::ensure!(request.is_ready(), "--ticker must not be empty");

    // One-shot run: no cache in front of the provider.
    let provider = YahooChartProvider::from_settings(&settings)?;
    let analyzer = Analyzer::new(Arc::new(provider), settings.report_dir());

    let result = match analyzer.run(&request, chrono::Utc::now()).await {
        Ok(AnalysisOutcome::Rendered(result)) => result,
        Ok(AnalysisOutcome::AwaitingInput) => anyhow::bail!("--ticker must not be empty"),
        Err(AnalysisError::Unclassified(err)) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err.context(format!("analysis of '{}' failed", request.ticker)));
        }
        Err(err) => return Err(err.into()),
    };

    for card in &result.metrics.cards {
        println!("{:<18} {}", card.label, card.display);
    }
    if let Some(warning) = &result.metrics.warning {
        tracing::warn!(%warning, "some metrics are missing");
    }

    let artifact = result.report?;
    let out_dir = args.out_dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out_path = out_dir.join(artifact.download_filename());
    std::fs::write(&out_path, artifact.html())
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    tracing::info!(
        ticker = %request.ticker,
        path = %out_path.display(),
        bytes = artifact.len(),
        "report saved"
    );
    println!("{}", out_path.display());

    Ok(())
}

fn init_sentry(settings: &stockperf_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
