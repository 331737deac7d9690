use std::fmt::Write;

use stockperf_core::analysis::{AnalysisOutcome, AnalysisResult};
use stockperf_core::domain::AnalysisRequest;
use stockperf_core::error::AnalysisError;
use stockperf_core::glossary::{glossary, GlossaryGroup};
use stockperf_core::report::escape_html;

const PAGE_TITLE: &str = "Stock Performance Report";

/// Query string that reproduces `req`, shared by the form and the download link.
pub fn request_query(req: &AnalysisRequest) -> String {
    format!(
        "ticker={}&benchmark={}&years={}",
        urlencoding::encode(&req.ticker),
        urlencoding::encode(req.benchmark.as_deref().unwrap_or("")),
        req.lookback_years
    )
}

pub fn render_dashboard(
    req: &AnalysisRequest,
    outcome: &Result<AnalysisOutcome, AnalysisError>,
) -> String {
    let mut analysis = String::new();
    match outcome {
        Ok(AnalysisOutcome::AwaitingInput) => {
            analysis.push_str(
                r#"<div class="alert info">&#128072; Enter a ticker in the sidebar to start the analysis.</div>"#,
            );
        }
        Ok(AnalysisOutcome::Rendered(result)) => write_result(&mut analysis, result),
        Err(AnalysisError::DataNotFound { ticker }) => {
            let _ = write!(
                analysis,
                r#"<div class="alert error">&#10060; No data found for '{}'. Please check the ticker.</div>"#,
                escape_html(ticker)
            );
        }
        Err(e) => {
            let _ = write!(
                analysis,
                r#"<div class="alert error">An error occurred during analysis: {}</div>
<div class="alert warning">Check that the ticker is correct and that data exists for it (e.g. Samsung Electronics &rarr; 005930.KS).</div>"#,
                escape_html(&format!("{e:#}"))
            );
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{PAGE_TITLE}</title>
<style>{PAGE_CSS}</style>
</head>
<body>
<aside class="sidebar">
<h2>&#9881;&#65039; Settings</h2>
{form}
<hr>
<h3>&#8505;&#65039; How to use</h3>
<ol>
<li>Enter a <b>stock ticker</b> (Korean listings use .KS / .KQ)</li>
<li>Enter a <b>benchmark</b></li>
<li>Choose the <b>period</b></li>
<li>Review the results</li>
</ol>
</aside>
<main>
<h1>&#128200; {PAGE_TITLE}</h1>
<div class="tabs">
<input type="radio" name="tab" id="tab-analysis" checked>
<label for="tab-analysis">&#128202; Analysis Dashboard</label>
<input type="radio" name="tab" id="tab-glossary">
<label for="tab-glossary">&#128218; Metric Glossary</label>
<section class="panel" id="panel-analysis">
{analysis}
</section>
<section class="panel" id="panel-glossary">
{glossary}
</section>
</div>
</main>
</body>
</html>
"#,
        form = render_form(req),
        glossary = render_glossary(glossary()),
    )
}

fn render_form(req: &AnalysisRequest) -> String {
    format!(
        r#"<form method="get" action="/">
<label>Ticker to analyze<input name="ticker" value="{ticker}" title="e.g. AAPL, MSFT, 005930.KS (Samsung Electronics)"></label>
<label>Benchmark ticker<input name="benchmark" value="{benchmark}" title="Index or stock to compare against (default: SPY, S&amp;P 500 ETF)"></label>
<label>Period (years): <output id="years-out">{years}</output><input type="range" name="years" min="1" max="10" value="{years}" oninput="document.getElementById('years-out').value=this.value"></label>
<button type="submit">Analyze</button>
</form>"#,
        ticker = escape_html(&req.ticker),
        benchmark = escape_html(req.benchmark.as_deref().unwrap_or("")),
        years = req.lookback_years,
    )
}

fn write_result(out: &mut String, result: &AnalysisResult) {
    out.push_str(r#"<h2>&#128202; Key Performance Metrics</h2><div class="cards">"#);
    for card in &result.metrics.cards {
        let _ = write!(
            out,
            r#"<div class="metric-card" title="{}"><div class="label">{}</div><div class="value">{}</div></div>"#,
            escape_html(&card.help),
            escape_html(&card.label),
            escape_html(&card.display)
        );
    }
    out.push_str("</div>");
    if let Some(warning) = &result.metrics.warning {
        let _ = write!(
            out,
            r#"<div class="alert warning">{}</div>"#,
            escape_html(warning)
        );
    }

    out.push_str(r#"<hr><h2>&#128209; Detailed Report</h2>
<div class="alert info">The report below contains the full analysis. If a term is unfamiliar, see the Metric Glossary tab.</div>"#);

    match &result.report {
        Ok(artifact) => {
            let _ = write!(
                out,
                r#"<iframe class="report" title="{title}" srcdoc="{srcdoc}"></iframe>
<p><a class="button" href="/report/download?{query}" download="{filename}">&#128229; Download report (HTML)</a></p>"#,
                title = escape_html(artifact.title()),
                srcdoc = escape_html(artifact.html()),
                query = escape_html(&request_query(&result.request)),
                filename = escape_html(&artifact.download_filename()),
            );
        }
        Err(e) => {
            let _ = write!(
                out,
                r#"<div class="alert error">{}</div>
<div class="alert warning">There may not be enough data, or it may be in an unexpected format.</div>"#,
                escape_html(&e.to_string())
            );
        }
    }
}

fn render_glossary(groups: &[GlossaryGroup]) -> String {
    let mut out = String::from(
        r#"<h2>&#128218; Report Terms Explained</h2><p>What each figure in the report means.</p><hr><div class="columns">"#,
    );
    for group in groups {
        let _ = write!(out, r#"<div class="column"><h3 class="group">{}</h3>"#, escape_html(group.title));
        for section in group.sections {
            let _ = write!(out, "<h3>{}</h3><ul>", escape_html(section.title));
            for entry in section.entries {
                let _ = write!(
                    out,
                    "<li><b>{}</b>: {}",
                    escape_html(entry.term),
                    escape_html(entry.description)
                );
                if !entry.notes.is_empty() {
                    out.push_str("<ul>");
                    for note in entry.notes {
                        let _ = write!(out, "<li>{}</li>", escape_html(note));
                    }
                    out.push_str("</ul>");
                }
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        out.push_str("</div>");
    }
    out.push_str(r#"</div><hr><div class="alert info">&#128161; <b>Tip</b>: keep this guide open next to the report on the Analysis Dashboard tab.</div>"#);
    out
}

const PAGE_CSS: &str = "\
body{margin:0;display:flex;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;color:#0f172a}\
.sidebar{width:280px;min-height:100vh;background:#f0f2f6;padding:1.5rem;box-sizing:border-box}\
.sidebar label{display:block;margin:0 0 1rem;font-size:14px}.sidebar input[name]{width:100%;padding:6px;margin-top:4px;box-sizing:border-box}\
main{flex:1;padding:2rem;min-width:0}\
.tabs>input{display:none}.tabs>label{display:inline-block;padding:8px 16px;cursor:pointer;border-bottom:2px solid transparent}\
.tabs>input:checked+label{border-bottom-color:#ef4444;font-weight:600}.panel{display:none;padding-top:1rem}\
#tab-analysis:checked~#panel-analysis,#tab-glossary:checked~#panel-glossary{display:block}\
.cards{display:grid;grid-template-columns:repeat(4,1fr);gap:1rem}\
.metric-card{background:#f0f2f6;padding:1rem;border-radius:.5rem;margin-bottom:1rem}\
.metric-card .label{font-size:14px;color:#475569}.metric-card .value{font-size:28px;font-weight:600}\
.alert{margin-top:1rem;padding:.75rem 1rem;border-radius:.5rem}.info{background:#e0f2fe}.warning{background:#fef9c3}.error{background:#fee2e2}\
iframe.report{width:100%;height:1000px;border:1px solid #e2e8f0}\
.button{display:inline-block;padding:8px 14px;border:1px solid #cbd5e1;border-radius:6px;text-decoration:none;color:#0f172a}\
.columns{display:grid;grid-template-columns:1fr 1fr;gap:2rem}h3.group{color:#64748b;font-size:14px;text-transform:uppercase}";
