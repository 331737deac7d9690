use chrono::NaiveDate;
use std::fmt::Write;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 280.0;
const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_Y: f64 = 20.0;

pub struct ChartLine<'a> {
    pub label: &'a str,
    pub color: &'static str,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Inline SVG line chart with a shared date axis. Values are fractions and
/// the y labels print them as percentages. `fill` shades the area between
/// each line and zero.
pub fn line_chart(lines: &[ChartLine<'_>], fill: bool) -> String {
    let all = lines.iter().flat_map(|l| l.points.iter());
    let (Some(first), Some(last)) = (
        all.clone().map(|p| p.0).min(),
        all.clone().map(|p| p.0).max(),
    ) else {
        return String::new();
    };
    let y_min = all.clone().map(|p| p.1).fold(0.0_f64, f64::min);
    let y_max = all.map(|p| p.1).fold(0.0_f64, f64::max);
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };
    let x_span = ((last - first).num_days().max(1)) as f64;

    let x = |d: NaiveDate| PAD_LEFT + (d - first).num_days() as f64 / x_span * (WIDTH - PAD_LEFT - PAD_RIGHT);
    let y = |v: f64| PAD_Y + (y_max - v) / y_span * (HEIGHT - 2.0 * PAD_Y);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" xmlns="http://www.w3.org/2000/svg" role="img">"#
    );
    let zero = y(0.0);
    let _ = write!(
        svg,
        r##"<line x1="{PAD_LEFT}" y1="{zero:.1}" x2="{:.1}" y2="{zero:.1}" stroke="#94a3b8" stroke-dasharray="4 3"/>"##,
        WIDTH - PAD_RIGHT
    );

    for line in lines {
        if line.points.is_empty() {
            continue;
        }
        let coords: Vec<String> = line
            .points
            .iter()
            .map(|(d, v)| format!("{:.1},{:.1}", x(*d), y(*v)))
            .collect();
        if fill {
            let x0 = x(line.points[0].0);
            let x1 = x(line.points[line.points.len() - 1].0);
            let _ = write!(
                svg,
                r#"<polygon points="{x0:.1},{zero:.1} {} {x1:.1},{zero:.1}" fill="{}" fill-opacity="0.25"/>"#,
                coords.join(" "),
                line.color
            );
        }
        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"><title>{}</title></polyline>"#,
            coords.join(" "),
            line.color,
            super::escape_html(line.label)
        );
    }

    let _ = write!(
        svg,
        r#"<text x="4" y="{:.1}" class="axis">{:.1}%</text><text x="4" y="{:.1}" class="axis">{:.1}%</text>"#,
        y(y_max) + 4.0,
        y_max * 100.0,
        y(y_min),
        y_min * 100.0
    );
    let _ = write!(
        svg,
        r#"<text x="{PAD_LEFT}" y="{HEIGHT}" class="axis">{first}</text><text x="{:.1}" y="{HEIGHT}" class="axis" text-anchor="end">{last}</text>"#,
        WIDTH - PAD_RIGHT
    );
    svg.push_str("</svg>");
    svg
}
