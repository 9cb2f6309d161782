//! Self-contained HTML rendering of an analysis summary.

use crate::types::{AnalysisSummary, DescriptiveStats};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;margin:0.5rem 0}\
th,td{border:1px solid #ccc;padding:0.25rem 0.6rem;text-align:right}\
th:first-child,td:first-child{text-align:left}\
.flagged{color:#b00020;font-weight:bold}";

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn stat_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("<td>{v:.3}</td>"),
        None => "<td>-</td>".to_string(),
    }
}

fn stats_row(column: &str, stats: &DescriptiveStats) -> String {
    let cells: String = [
        stats.mean, stats.std, stats.min, stats.q25, stats.q50, stats.q75, stats.max,
    ]
    .into_iter()
    .map(stat_cell)
    .collect();
    format!(
        "<tr><td>{}</td><td>{}</td>{cells}</tr>",
        escape_html(column),
        stats.count
    )
}

/// Render the summary as a complete HTML document.
pub fn render_html_report(summary: &AnalysisSummary) -> String {
    let mut lines: Vec<String> = vec![
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "<meta charset=\"utf-8\">".to_string(),
        "<title>InsightLens Report</title>".to_string(),
        format!("<style>{STYLE}</style>"),
        "</head>".to_string(),
        "<body>".to_string(),
        "<h1>InsightLens Report</h1>".to_string(),
    ];

    lines.push("<h2>Summary</h2>".to_string());
    lines.push(format!(
        "<p>Rows: {} | Columns: {}</p>",
        summary.n_rows, summary.n_columns
    ));
    lines.push(format!(
        "<p>Missing cells: {:.1}%</p>",
        summary.overall_missing_fraction() * 100.0
    ));

    lines.push("<h2>Column types</h2>".to_string());
    lines.push("<ul>".to_string());
    for column in summary.column_summaries() {
        lines.push(format!(
            "<li><strong>{}</strong>: {} ({} missing)</li>",
            escape_html(&column.name),
            column.inferred_type,
            column.missing_count
        ));
    }
    lines.push("</ul>".to_string());

    lines.push("<h2>Missingness</h2>".to_string());
    lines.push("<ul>".to_string());
    for (column, count) in &summary.missingness {
        let line = match summary.missing_flags.get(column) {
            Some(fraction) => format!(
                "<li class=\"flagged\">{}: {count} missing ({:.1}%, flagged)</li>",
                escape_html(column),
                fraction * 100.0
            ),
            None => format!("<li>{}: {count} missing</li>", escape_html(column)),
        };
        lines.push(line);
    }
    lines.push("</ul>".to_string());

    lines.push("<h2>Duplicates</h2>".to_string());
    lines.push(format!(
        "<p>Duplicate rows: {}</p>",
        summary.duplicate_count
    ));
    if !summary.duplicate_sample_indices.is_empty() {
        let indices: Vec<String> = summary
            .duplicate_sample_indices
            .iter()
            .map(|i| i.to_string())
            .collect();
        lines.push(format!("<p>Sample row indices: {}</p>", indices.join(", ")));
    }

    lines.push("<h2>Outliers (IQR rule)</h2>".to_string());
    if summary.outliers.is_empty() {
        lines.push("<p>No numeric outliers detected or no numeric columns.</p>".to_string());
    } else {
        lines.push("<ul>".to_string());
        for (column, stats) in &summary.outliers {
            lines.push(format!(
                "<li>{}: {} outliers (lower={:.3}, upper={:.3})</li>",
                escape_html(column),
                stats.outlier_count,
                stats.lower,
                stats.upper
            ));
        }
        lines.push("</ul>".to_string());
    }

    lines.push("<h2>Descriptive statistics</h2>".to_string());
    if summary.descriptive_stats.is_empty() {
        lines.push("<p>No numeric columns.</p>".to_string());
    } else {
        lines.push("<table>".to_string());
        lines.push(
            "<tr><th>column</th><th>count</th><th>mean</th><th>std</th><th>min</th>\
             <th>25%</th><th>50%</th><th>75%</th><th>max</th></tr>"
                .to_string(),
        );
        for (column, stats) in &summary.descriptive_stats {
            lines.push(stats_row(column, stats));
        }
        lines.push("</table>".to_string());
    }

    lines.push("<h2>Type consistency</h2>".to_string());
    if summary.type_issues.is_empty() {
        lines.push("<p>Every column holds a single kind of value.</p>".to_string());
    } else {
        lines.push("<ul>".to_string());
        for (column, issue) in &summary.type_issues {
            let kinds: Vec<String> = issue
                .types
                .iter()
                .map(|(kind, count)| format!("{}: {count}", kind.label()))
                .collect();
            lines.push(format!(
                "<li>{}: {}</li>",
                escape_html(column),
                kinds.join(", ")
            ));
        }
        lines.push("</ul>".to_string());
    }

    if !summary.column_faults.is_empty() {
        lines.push("<h2>Computation faults</h2>".to_string());
        lines.push("<ul>".to_string());
        for fault in &summary.column_faults {
            lines.push(format!(
                "<li>{} / {}: {}</li>",
                escape_html(&fault.rule),
                escape_html(&fault.column),
                escape_html(&fault.message)
            ));
        }
        lines.push("</ul>".to_string());
    }

    lines.push("</body>".to_string());
    lines.push("</html>".to_string());
    lines.join("\n")
}
