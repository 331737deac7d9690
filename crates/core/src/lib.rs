pub mod analysis;
pub mod domain;
pub mod error;
pub mod glossary;
pub mod ingest;
pub mod report;
pub mod stats;
pub mod time;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    pub const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: String,
        pub market_data_timeout: Duration,
        pub fetch_cache_ttl: Duration,
        pub report_dir: Option<PathBuf>,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                market_data_base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
                market_data_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                fetch_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                report_dir: None,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let market_data_base_url = std::env::var("MARKET_DATA_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MARKET_DATA_BASE_URL.to_string());

            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
                market_data_base_url,
                market_data_timeout: Duration::from_secs(secs_from_env(
                    "MARKET_DATA_TIMEOUT_SECS",
                    DEFAULT_TIMEOUT_SECS,
                )?),
                fetch_cache_ttl: Duration::from_secs(secs_from_env(
                    "FETCH_CACHE_TTL_SECS",
                    DEFAULT_CACHE_TTL_SECS,
                )?),
                report_dir: std::env::var_os("REPORT_DIR").map(PathBuf::from),
            })
        }

        /// Directory that per-request report artifacts are created in.
        pub fn report_dir(&self) -> PathBuf {
            self.report_dir.clone().unwrap_or_else(std::env::temp_dir)
        }
    }

    fn secs_from_env(key: &str, default: u64) -> anyhow::Result<u64> {
        match std::env::var(key) {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be an integer number of seconds")),
            _ => Ok(default),
        }
    }

}
