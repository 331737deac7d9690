use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockperf_core::analysis::{AnalysisOutcome, Analyzer};
use stockperf_core::domain::request::{DEFAULT_BENCHMARK, DEFAULT_LOOKBACK_YEARS, DEFAULT_TICKER};
use stockperf_core::domain::{AnalysisRequest, MetricCard};
use stockperf_core::error::AnalysisError;
use stockperf_core::glossary::{glossary, GlossaryGroup};
use stockperf_core::report::REPORT_MIME;

use crate::views::{render_dashboard, request_query};

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/report/download", get(download_report))
        .route("/api/analysis", get(get_analysis))
        .route("/api/glossary", get(get_glossary))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Raw form input. A missing field takes its default; an empty `ticker`
/// means nothing has been asked yet and an empty `benchmark` turns the
/// comparison off.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    ticker: Option<String>,
    benchmark: Option<String>,
    years: Option<String>,
}

impl AnalysisQuery {
    pub fn into_request(self) -> AnalysisRequest {
        let years = self
            .years
            .as_deref()
            .and_then(|y| y.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_LOOKBACK_YEARS);
        AnalysisRequest::new(
            self.ticker.as_deref().unwrap_or(DEFAULT_TICKER),
            Some(self.benchmark.as_deref().unwrap_or(DEFAULT_BENCHMARK)),
            years,
        )
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn run(state: &AppState, req: &AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
    let outcome = state.analyzer.run(req, Utc::now()).await;
    if let Err(AnalysisError::Unclassified(e)) = &outcome {
        sentry_anyhow::capture_anyhow(e);
        tracing::error!(ticker = %req.ticker, error = %format!("{e:#}"), "analysis failed");
    }
    outcome
}

async fn dashboard(State(state): State<AppState>, Query(query): Query<AnalysisQuery>) -> Html<String> {
    let req = query.into_request();
    let outcome = run(&state, &req).await;
    Html(render_dashboard(&req, &outcome))
}

fn error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::DataNotFound { .. } => StatusCode::NOT_FOUND,
        AnalysisError::Unclassified(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::ReportGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        // Only ever a warning inside a rendered result.
        AnalysisError::MetricComputation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn download_report(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Response, StatusCode> {
    let req = query.into_request();
    let result = match run(&state, &req).await {
        Ok(AnalysisOutcome::Rendered(result)) => result,
        Ok(AnalysisOutcome::AwaitingInput) => return Err(StatusCode::BAD_REQUEST),
        Err(e) => return Err(error_status(&e)),
    };
    let artifact = result.report.map_err(|e| error_status(&e))?;

    let headers = [
        (header::CONTENT_TYPE, format!("{REPORT_MIME}; charset=utf-8")),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.download_filename()),
        ),
    ];
    Ok((headers, artifact.into_html()).into_response())
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn from_analysis(err: &AnalysisError) -> (StatusCode, Json<ApiError>) {
        (
            error_status(err),
            Json(ApiError {
                kind: err.kind(),
                message: format!("{err:#}"),
            }),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ReportStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    ticker: String,
    benchmark: Option<String>,
    lookback_years: u32,
    period: String,
    window_start: NaiveDate,
    window_end: NaiveDate,
    subject_points: usize,
    benchmark_points: Option<usize>,
    cards: Vec<MetricCard>,
    warning: Option<String>,
    report: ReportStatus,
}

async fn get_analysis(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisSummary>, (StatusCode, Json<ApiError>)> {
    let req = query.into_request();
    let result = match run(&state, &req).await {
        Ok(AnalysisOutcome::Rendered(result)) => *result,
        Ok(AnalysisOutcome::AwaitingInput) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    kind: "awaiting_input",
                    message: "ticker is empty".to_string(),
                }),
            ))
        }
        Err(e) => return Err(ApiError::from_analysis(&e)),
    };

    let report = match &result.report {
        Ok(artifact) => ReportStatus {
            ok: true,
            bytes: Some(artifact.len()),
            filename: Some(artifact.download_filename()),
            download_url: Some(format!("/report/download?{}", request_query(&result.request))),
            error: None,
        },
        Err(e) => ReportStatus {
            ok: false,
            bytes: None,
            filename: None,
            download_url: None,
            error: Some(e.to_string()),
        },
    };

    Ok(Json(AnalysisSummary {
        period: result.request.period(),
        ticker: result.request.ticker,
        benchmark: result.request.benchmark,
        lookback_years: result.request.lookback_years,
        window_start: result.window.start.date_naive(),
        window_end: result.window.end.date_naive(),
        subject_points: result.subject_points,
        benchmark_points: result.benchmark_points,
        cards: result.metrics.cards,
        warning: result.metrics.warning,
        report,
    }))
}

async fn get_glossary() -> Json<&'static [GlossaryGroup]> {
    Json(glossary())
}
