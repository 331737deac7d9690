use thiserror::Error;

/// Failure kinds of one analysis pass. Only `DataNotFound` and
/// `Unclassified` end a pass; the other two are carried next to whatever
/// did succeed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no price data found for '{ticker}'")]
    DataNotFound { ticker: String },

    /// Warning only: `compute_metrics` renders it into `MetricCards::warning`
    /// and `Analyzer::run` never returns it as an error.
    #[error("some metrics could not be computed: {0}")]
    MetricComputation(String),

    #[error("report generation failed: {0}")]
    ReportGeneration(String),

    #[error(transparent)]
    Unclassified(#[from] anyhow::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::DataNotFound { .. } => "data_not_found",
            AnalysisError::MetricComputation(_) => "metric_computation",
            AnalysisError::ReportGeneration(_) => "report_generation",
            AnalysisError::Unclassified(_) => "unclassified",
        }
    }
}
