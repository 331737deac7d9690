pub mod artifact;
pub mod chart;
pub mod html;

pub use artifact::{build_report, download_filename, ReportArtifact, REPORT_MIME};
pub use html::render_report;

/// Minimal escaping for text and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
