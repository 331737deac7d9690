use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockperf_core::analysis::Analyzer;
use stockperf_core::ingest::{CachedReturnsProvider, YahooChartProvider};

mod routes;
mod views;

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

    let provider = CachedReturnsProvider::new(
        YahooChartProvider::from_settings(&settings)?,
        settings.fetch_cache_ttl,
    );
    let report_dir = settings.report_dir();
    tracing::info!(
        base_url = %settings.market_data_base_url,
        cache_ttl_secs = settings.fetch_cache_ttl.as_secs(),
        report_dir = %report_dir.display(),
        "market data configured"
    );

    let state = routes::AppState {
        analyzer: Analyzer::new(Arc::new(provider), report_dir),
    };

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
