use crate::config::Settings;
use crate::domain::ReturnSeries;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

const CHART_PATH: &str = "/v8/finance/chart";
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Source of daily return series. An unknown symbol is an empty series, not
/// an error; errors are reserved for transport and decoding failures.
#[async_trait::async_trait]
pub trait ReturnsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_returns(&self, ticker: &str, period: &str) -> Result<ReturnSeries>;
}

#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.market_data_timeout)
            .default_headers(default_headers())
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: settings.market_data_base_url.clone(),
        })
    }

    fn url(&self, ticker: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            CHART_PATH,
            urlencoding::encode(ticker)
        )
    }
}

#[async_trait::async_trait]
impl ReturnsProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_returns(&self, ticker: &str, period: &str) -> Result<ReturnSeries> {
        let res = self
            .http
            .get(self.url(ticker))
            .query(&[
                ("range", period),
                ("interval", "1d"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        if status == StatusCode::NOT_FOUND {
            tracing::info!(%ticker, period, "market data provider does not know symbol");
            return Ok(ReturnSeries::empty(ticker));
        }
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        let series = parse_chart_response(ticker, &text)?;
        tracing::debug!(%ticker, period, points = series.len(), "fetched return series");
        Ok(series)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(REFERER, HeaderValue::from_static("https://finance.yahoo.com/"));
    headers
}

pub(crate) fn parse_chart_response(ticker: &str, body: &str) -> Result<ReturnSeries> {
    let parsed: ChartResponse =
        serde_json::from_str(body).context("failed to parse market data chart response")?;

    if let Some(err) = parsed.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Ok(ReturnSeries::empty(ticker));
        }
        anyhow::bail!("market data error {}: {}", err.code, err.description);
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(ReturnSeries::empty(ticker));
    };

    let closes = result.closes();
    Ok(ReturnSeries::from_closes(ticker, &closes))
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

/// Exchange offset from UTC in seconds; bars are dated in exchange-local time.
#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Adjusted closes when the provider sends them, raw closes otherwise.
    /// Bars with a missing price are dropped.
    fn closes(&self) -> Vec<(NaiveDate, f64)> {
        let prices = self
            .indicators
            .adjclose
            .first()
            .map(|a| &a.adjclose)
            .filter(|v| !v.is_empty())
            .or_else(|| self.indicators.quote.first().map(|q| &q.close));

        let Some(prices) = prices else {
            return Vec::new();
        };

        let offset = self.meta.gmtoffset;
        let mut out: Vec<(NaiveDate, f64)> = Vec::with_capacity(self.timestamp.len());
        for (ts, price) in self.timestamp.iter().zip(prices.iter()) {
            let (Some(price), Some(dt)) = (price, DateTime::from_timestamp(*ts + offset, 0)) else {
                continue;
            };
            let date = dt.date_naive();
            // Intraday "live" bar can repeat the last session's date.
            if let Some(last) = out.last_mut() {
                if last.0 == date {
                    last.1 = *price;
                    continue;
                }
            }
            out.push((date, *price));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart(timestamps: &[i64], closes: &[Option<f64>], adj: Option<&[Option<f64>]>) -> String {
        let mut indicators = json!({ "quote": [{ "close": closes }] });
        if let Some(adj) = adj {
            indicators["adjclose"] = json!([{ "adjclose": adj }]);
        }
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "currency": "USD" },
                    "timestamp": timestamps,
                    "indicators": indicators
                }],
                "error": null
            }
        })
        .to_string()
    }

    // 2025-01-02, 2025-01-03, 2025-01-06 at 14:30 UTC
    const TS: [i64; 3] = [1_735_828_200, 1_735_914_600, 1_736_173_800];

    #[test]
    fn prefers_adjusted_close() {
        let body = chart(
            &TS,
            &[Some(1.0), Some(1.0), Some(1.0)],
            Some(&[Some(100.0), Some(102.0), Some(99.96)]),
        );
        let s = parse_chart_response("AAPL", &body).unwrap();
        assert_eq!(s.len(), 2);
        assert!((s.points[0].value - 0.02).abs() < 1e-12);
        assert!((s.points[1].value - (-0.02)).abs() < 1e-9);
        assert_eq!(s.first_date(), NaiveDate::from_ymd_opt(2025, 1, 3));
    }

    #[test]
    fn falls_back_to_close_and_skips_nulls() {
        let body = chart(&TS, &[Some(50.0), None, Some(55.0)], None);
        let s = parse_chart_response("AAPL", &body).unwrap();
        assert_eq!(s.len(), 1);
        assert!((s.points[0].value - 0.10).abs() < 1e-12);
    }

    #[test]
    fn not_found_error_is_empty_series() {
        let body = json!({
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        })
        .to_string();
        let s = parse_chart_response("ZZZZZZ9.INVALID", &body).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.symbol, "ZZZZZZ9.INVALID");
    }

    #[test]
    fn other_chart_errors_are_reported() {
        let body = json!({
            "chart": { "result": null, "error": { "code": "Bad Request", "description": "Invalid range" } }
        })
        .to_string();
        let err = parse_chart_response("AAPL", &body).unwrap_err();
        assert!(err.to_string().contains("Invalid range"));
    }

    #[test]
    fn bars_are_dated_in_exchange_local_time() {
        // 23:00 UTC is 10:00 the next morning in Sydney (UTC+11).
        let body = json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "BHP.AX", "gmtoffset": 39_600 },
                    "timestamp": [1_735_858_800_i64, 1_735_945_200_i64],
                    "indicators": { "quote": [{ "close": [40.0, 41.0] }] }
                }],
                "error": null
            }
        })
        .to_string();
        let s = parse_chart_response("BHP.AX", &body).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.first_date(), NaiveDate::from_ymd_opt(2025, 1, 4));
    }

    async fn serve_canned_charts() -> YahooChartProvider {
        use axum::extract::Path;
        use axum::routing::get;

        async fn chart_route(Path(symbol): Path<String>) -> (axum::http::StatusCode, String) {
            use axum::http::StatusCode;
            match symbol.as_str() {
                "AAPL" => (
                    StatusCode::OK,
                    chart(&TS, &[Some(100.0), Some(101.0), Some(102.01)], None),
                ),
                "DELISTED" => (
                    StatusCode::OK,
                    json!({
                        "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found" } }
                    })
                    .to_string(),
                ),
                "DOWN" => (StatusCode::SERVICE_UNAVAILABLE, "try later".to_string()),
                _ => (StatusCode::NOT_FOUND, "{}".to_string()),
            }
        }

        let app = axum::Router::new().route("/v8/finance/chart/:symbol", get(chart_route));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        YahooChartProvider::from_settings(&Settings {
            market_data_base_url: format!("http://{addr}"),
            ..Settings::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_returns_over_http() {
        let provider = serve_canned_charts().await;
        let s = provider.fetch_returns("AAPL", "1y").await.unwrap();
        assert_eq!(s.len(), 2);
        assert!((s.points[0].value - 0.01).abs() < 1e-12);
    }

    #[tokio::test]
    async fn unknown_symbol_over_http_is_empty() {
        let provider = serve_canned_charts().await;

        let s = provider.fetch_returns("ZZZZZZ9.INVALID", "1y").await.unwrap();
        assert!(s.is_empty());

        let s = provider.fetch_returns("DELISTED", "1y").await.unwrap();
        assert!(s.is_empty());
    }

    #[tokio::test]
    async fn server_errors_are_reported() {
        let provider = serve_canned_charts().await;
        let err = provider.fetch_returns("DOWN", "1y").await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("503"), "{msg}");
        assert!(msg.contains("try later"), "{msg}");
    }

    #[test]
    fn chart_url_escapes_symbol() {
        let provider = YahooChartProvider::from_settings(&Settings {
            market_data_base_url: "http://localhost:9000/".into(),
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(
            provider.url("005930.KS"),
            "http://localhost:9000/v8/finance/chart/005930.KS"
        );
        assert_eq!(
            provider.url("^GSPC"),
            "http://localhost:9000/v8/finance/chart/%5EGSPC"
        );
    }
}
