use super::chart::{line_chart, ChartLine};
use super::escape_html;
use crate::domain::ReturnSeries;
use crate::stats::drawdown::worst_periods;
use crate::stats::{
    drawdown_periods, drawdown_series, monthly_returns, yearly_returns, PerformanceSummary,
};
use anyhow::{ensure, Result};
use chrono::NaiveDate;
use std::fmt::Write;

const SUBJECT_COLOR: &str = "#2563eb";
const BENCHMARK_COLOR: &str = "#f97316";
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Clone, Copy)]
enum Fmt {
    Pct,
    Ratio,
    Days,
}

type Getter = fn(&PerformanceSummary) -> Option<f64>;

const METRIC_GROUPS: &[(&str, &[(&str, Fmt, Getter)])] = &[
    (
        "Returns",
        &[
            ("Cumulative Return", Fmt::Pct, |s| s.cumulative_return),
            ("CAGR", Fmt::Pct, |s| s.cagr),
            ("Expected Daily %", Fmt::Pct, |s| s.expected_daily),
            ("Expected Monthly %", Fmt::Pct, |s| s.expected_monthly),
            ("Expected Yearly %", Fmt::Pct, |s| s.expected_yearly),
            ("Best Day", Fmt::Pct, |s| s.best_day),
            ("Worst Day", Fmt::Pct, |s| s.worst_day),
            ("Best Month", Fmt::Pct, |s| s.best_month),
            ("Worst Month", Fmt::Pct, |s| s.worst_month),
            ("Best Year", Fmt::Pct, |s| s.best_year),
            ("Worst Year", Fmt::Pct, |s| s.worst_year),
            ("Win Days %", Fmt::Pct, |s| s.win_days),
            ("Win Month %", Fmt::Pct, |s| s.win_months),
            ("Win Year %", Fmt::Pct, |s| s.win_years),
        ],
    ),
    (
        "Risk",
        &[
            ("Max Drawdown", Fmt::Pct, |s| s.max_drawdown),
            ("Volatility (ann.)", Fmt::Pct, |s| s.volatility),
            ("Longest DD Days", Fmt::Days, |s| {
                s.longest_drawdown_days.map(|d| d as f64)
            }),
            ("Avg. Drawdown", Fmt::Pct, |s| s.avg_drawdown),
            ("Avg. Drawdown Days", Fmt::Days, |s| s.avg_drawdown_days),
            ("Daily Value-at-Risk", Fmt::Pct, |s| s.value_at_risk),
        ],
    ),
    (
        "Risk-Adjusted",
        &[
            ("Sharpe", Fmt::Ratio, |s| s.sharpe),
            ("Sortino", Fmt::Ratio, |s| s.sortino),
            ("Calmar", Fmt::Ratio, |s| s.calmar),
        ],
    ),
    (
        "Other Statistics",
        &[
            ("Skew", Fmt::Ratio, |s| s.skew),
            ("Kurtosis", Fmt::Ratio, |s| s.kurtosis),
            ("Kelly Criterion", Fmt::Pct, |s| s.kelly),
        ],
    ),
];

const RELATIVE_ROWS: &[(&str, Fmt, Getter)] = &[
    ("Beta", Fmt::Ratio, |s| s.relative.map(|r| r.beta)),
    ("Alpha", Fmt::Pct, |s| s.relative.map(|r| r.alpha)),
    ("Correlation", Fmt::Pct, |s| s.relative.map(|r| r.correlation)),
    ("R^2", Fmt::Ratio, |s| s.relative.map(|r| r.r_squared)),
    ("Information Ratio", Fmt::Ratio, |s| {
        s.relative.map(|r| r.information_ratio)
    }),
];

fn fmt_value(fmt: Fmt, v: Option<f64>) -> String {
    match v {
        None => "-".to_string(),
        Some(v) => match fmt {
            Fmt::Pct => format!("{:.2}%", v * 100.0),
            Fmt::Ratio => format!("{v:.2}"),
            Fmt::Days => format!("{v:.0}"),
        },
    }
}

/// Renders the full, self-contained report page. Identical inputs give
/// byte-identical output.
pub fn render_report(
    subject: &ReturnSeries,
    benchmark: Option<&ReturnSeries>,
    title: &str,
) -> Result<String> {
    ensure!(
        !subject.is_empty(),
        "no returns for '{}' to report on",
        subject.symbol
    );
    if let Some(b) = benchmark {
        ensure!(
            crate::stats::align(subject, b).len() >= 2,
            "benchmark '{}' has no overlapping data with '{}'",
            b.symbol,
            subject.symbol
        );
    }

    let subject_summary = PerformanceSummary::compute(subject, benchmark);
    let benchmark_summary = benchmark.map(|b| PerformanceSummary::compute(b, None));

    let mut body = String::new();
    write_header(&mut body, subject, benchmark, title);
    write_metrics(&mut body, &subject_summary, benchmark_summary.as_ref(), benchmark);
    write_charts(&mut body, subject, benchmark);
    write_yearly(&mut body, subject, benchmark);
    write_monthly(&mut body, subject);
    write_worst_drawdowns(&mut body, subject);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{REPORT_CSS}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    ))
}

fn write_header(
    out: &mut String,
    subject: &ReturnSeries,
    benchmark: Option<&ReturnSeries>,
    title: &str,
) {
    let range = match (subject.first_date(), subject.last_date()) {
        (Some(a), Some(b)) => format!("{a} ~ {b}"),
        _ => String::new(),
    };
    let bench = benchmark
        .map(|b| format!(" &middot; Benchmark: {}", escape_html(&b.symbol)))
        .unwrap_or_default();
    let _ = write!(
        out,
        r#"<header><h1>{}</h1><p class="sub">{range} &middot; {} trading days{bench}</p></header>"#,
        escape_html(title),
        subject.len()
    );
}

fn write_metrics(
    out: &mut String,
    subject: &PerformanceSummary,
    benchmark: Option<&PerformanceSummary>,
    benchmark_series: Option<&ReturnSeries>,
) {
    out.push_str(r#"<section><h2>Key Performance Metrics</h2><table class="metrics"><thead><tr><th>Metric</th><th>Strategy</th>"#);
    if let Some(b) = benchmark_series {
        let _ = write!(out, "<th>Benchmark ({})</th>", escape_html(&b.symbol));
    }
    out.push_str("</tr></thead><tbody>");

    let cols = if benchmark.is_some() { 3 } else { 2 };
    for (group, rows) in METRIC_GROUPS {
        let _ = write!(out, r#"<tr class="group"><td colspan="{cols}">{group}</td></tr>"#);
        for (label, fmt, get) in rows.iter() {
            let _ = write!(out, "<tr><td>{label}</td><td>{}</td>", fmt_value(*fmt, get(subject)));
            if let Some(b) = benchmark {
                let _ = write!(out, "<td>{}</td>", fmt_value(*fmt, get(b)));
            }
            out.push_str("</tr>");
        }
    }

    if benchmark.is_some() {
        let _ = write!(
            out,
            r#"<tr class="group"><td colspan="{cols}">Versus Benchmark</td></tr>"#
        );
        for (label, fmt, get) in RELATIVE_ROWS {
            let _ = write!(
                out,
                "<tr><td>{label}</td><td>{}</td><td>-</td></tr>",
                fmt_value(*fmt, get(subject))
            );
        }
    }
    out.push_str("</tbody></table></section>");
}

fn cumulative(series: &ReturnSeries) -> Vec<(NaiveDate, f64)> {
    let mut equity = 1.0;
    series
        .points
        .iter()
        .map(|p| {
            equity *= 1.0 + p.value;
            (p.date, equity - 1.0)
        })
        .collect()
}

fn write_charts(out: &mut String, subject: &ReturnSeries, benchmark: Option<&ReturnSeries>) {
    let mut lines = vec![ChartLine {
        label: &subject.symbol,
        color: SUBJECT_COLOR,
        points: cumulative(subject),
    }];
    if let Some(b) = benchmark {
        lines.push(ChartLine {
            label: &b.symbol,
            color: BENCHMARK_COLOR,
            points: cumulative(b),
        });
    }
    let legend: String = lines
        .iter()
        .map(|l| {
            format!(
                r#"<span class="key" style="background:{}"></span>{}"#,
                l.color,
                escape_html(l.label)
            )
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        out,
        r#"<section><h2>Cumulative Returns</h2><p class="legend">{legend}</p>{}</section>"#,
        line_chart(&lines, false)
    );

    let underwater = [ChartLine {
        label: &subject.symbol,
        color: "#dc2626",
        points: drawdown_series(subject),
    }];
    let _ = write!(
        out,
        r#"<section><h2>Underwater Plot (Drawdown)</h2>{}</section>"#,
        line_chart(&underwater, true)
    );
}

fn write_yearly(out: &mut String, subject: &ReturnSeries, benchmark: Option<&ReturnSeries>) {
    let years = yearly_returns(subject);
    let bench_years = benchmark.map(yearly_returns).unwrap_or_default();

    out.push_str(r#"<section><h2>EOY Returns</h2><table class="eoy"><thead><tr><th>Year</th><th>Strategy</th>"#);
    if benchmark.is_some() {
        out.push_str("<th>Benchmark</th><th>Multiplier</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for y in &years {
        let _ = write!(out, "<tr><td>{}</td><td>{}</td>", y.year, fmt_value(Fmt::Pct, Some(y.value)));
        if benchmark.is_some() {
            let b = bench_years.iter().find(|b| b.year == y.year).map(|b| b.value);
            let multiplier = b.filter(|b| *b != 0.0).map(|b| y.value / b);
            let _ = write!(
                out,
                "<td>{}</td><td>{}</td>",
                fmt_value(Fmt::Pct, b),
                fmt_value(Fmt::Ratio, multiplier)
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></section>");
}

fn heat_color(v: f64) -> String {
    let alpha = 0.1 + (v.abs() / 0.1).min(1.0) * 0.7;
    if v >= 0.0 {
        format!("rgba(22,163,74,{alpha:.2})")
    } else {
        format!("rgba(220,38,38,{alpha:.2})")
    }
}

fn write_monthly(out: &mut String, subject: &ReturnSeries) {
    let months = monthly_returns(subject);
    out.push_str(r#"<section><h2>Monthly Returns (%)</h2><table class="heat"><thead><tr><th>Year</th>"#);
    for m in MONTHS {
        let _ = write!(out, "<th>{m}</th>");
    }
    out.push_str("</tr></thead><tbody>");

    let mut years: Vec<i32> = months.iter().map(|m| m.year).collect();
    years.dedup();
    for year in years {
        let _ = write!(out, "<tr><td>{year}</td>");
        for month in 1..=12u32 {
            match months
                .iter()
                .find(|m| m.year == year && m.month == Some(month))
            {
                Some(m) => {
                    let _ = write!(
                        out,
                        r#"<td style="background:{}">{:.2}</td>"#,
                        heat_color(m.value),
                        m.value * 100.0
                    );
                }
                None => out.push_str("<td></td>"),
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table></section>");
}

fn write_worst_drawdowns(out: &mut String, subject: &ReturnSeries) {
    let worst = worst_periods(&drawdown_periods(subject), 5);
    out.push_str(r#"<section><h2>Worst 5 Drawdowns</h2><table class="dd"><thead><tr><th>Started</th><th>Valley</th><th>Recovered</th><th>Drawdown</th><th>Days</th></tr></thead><tbody>"#);
    if worst.is_empty() {
        out.push_str(r#"<tr><td colspan="5">No drawdowns in this period</td></tr>"#);
    }
    for p in worst {
        let recovered = if p.recovered {
            p.end.to_string()
        } else {
            "-".to_string()
        };
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{recovered}</td><td>{}</td><td>{}</td></tr>",
            p.start,
            p.valley,
            fmt_value(Fmt::Pct, Some(p.max_drawdown)),
            p.days
        );
    }
    out.push_str("</tbody></table></section>");
}

const REPORT_CSS: &str = "\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;margin:0;padding:24px 32px;color:#0f172a;background:#fff}\
h1{margin:0 0 4px;font-size:26px}h2{font-size:18px;margin:28px 0 10px;border-bottom:1px solid #e2e8f0;padding-bottom:6px}\
.sub{color:#64748b;margin:0}table{border-collapse:collapse;font-size:13px}\
th,td{padding:5px 10px;text-align:right;border-bottom:1px solid #f1f5f9}th:first-child,td:first-child{text-align:left}\
thead th{background:#f8fafc;color:#475569}tr.group td{font-weight:600;background:#f1f5f9;text-align:left}\
table.metrics{min-width:480px}table.heat td{min-width:44px;text-align:center}\
.chart{width:100%;max-width:960px;height:auto}.axis{font-size:11px;fill:#64748b}\
.legend{font-size:13px}.key{display:inline-block;width:12px;height:12px;margin:0 4px 0 10px;border-radius:2px;vertical-align:middle}";
