use super::html::render_report;
use crate::domain::ReturnSeries;
use crate::error::AnalysisError;
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub const REPORT_MIME: &str = "text/html";

/// One rendered report. The backing file is private to this value and is
/// removed when it is dropped.
#[derive(Debug)]
pub struct ReportArtifact {
    ticker: String,
    title: String,
    html: String,
    file: NamedTempFile,
}

impl ReportArtifact {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    /// `{ticker}_report.html`, with anything unsafe for a file name replaced.
    pub fn download_filename(&self) -> String {
        download_filename(&self.ticker)
    }

    /// Takes the HTML and deletes the backing file.
    pub fn into_html(self) -> String {
        self.html
    }
}

pub fn download_filename(ticker: &str) -> String {
    let safe: String = ticker
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '=') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}_report.html")
}

/// Renders the report for `subject` (optionally against `benchmark`) into a
/// fresh temporary file under `dir`, then reads it back.
pub fn build_report(
    subject: &ReturnSeries,
    benchmark: Option<&ReturnSeries>,
    title: &str,
    dir: &Path,
) -> Result<ReportArtifact, AnalysisError> {
    write_report(subject, benchmark, title, dir)
        .map_err(|e| AnalysisError::ReportGeneration(format!("{e:#}")))
}

fn write_report(
    subject: &ReturnSeries,
    benchmark: Option<&ReturnSeries>,
    title: &str,
    dir: &Path,
) -> anyhow::Result<ReportArtifact> {
    let rendered = render_report(subject, benchmark, title)?;

    let mut file = tempfile::Builder::new()
        .prefix("stockperf-")
        .suffix(".html")
        .tempfile_in(dir)
        .with_context(|| format!("failed to create report file in {}", dir.display()))?;
    file.write_all(rendered.as_bytes())
        .context("failed to write report file")?;
    file.flush().context("failed to flush report file")?;

    let html = std::fs::read_to_string(file.path()).context("failed to read report file back")?;

    tracing::debug!(
        ticker = %subject.symbol,
        path = %file.path().display(),
        bytes = html.len(),
        "report written"
    );

    Ok(ReportArtifact {
        ticker: subject.symbol.clone(),
        title: title.to_string(),
        html,
        file,
    })
}
