//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use markgrade_core::report::GradingReport;
use markgrade_core::statistics::QuestionStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn index_list(indices: &std::collections::BTreeSet<u32>) -> String {
    if indices.is_empty() {
        return "-".to_string();
    }
    indices
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate an HTML page from a grading report.
pub fn generate_html(report: &GradingReport) -> String {
    let mut html = String::new();
    let summary = &report.summary;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>markgrade report: {}</title>\n",
        html_escape(&report.key.source)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>markgrade report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Answer key: <strong>{}</strong> | {} questions | {} submissions | {}</p>\n",
        html_escape(&report.key.source),
        report.key.question_count,
        summary.submissions,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if summary.placeholder_submissions > 0 {
        html.push_str(&format!(
            "<p class=\"warning\">{} of {} results use placeholder answers. \
             Mark recognition is not implemented; these scores are not real.</p>\n",
            summary.placeholder_submissions, summary.submissions
        ));
    }

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Submissions</th><th>Mean score</th><th>Mean %</th><th>Min</th><th>Max</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{:.2}</td><td>{:.1}%</td><td>{}</td><td>{}</td></tr></tbody>\n",
        summary.submissions,
        summary.mean_score,
        summary.mean_percent,
        summary.min_score,
        summary.max_score,
    ));
    html.push_str("</table>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Key: <code>{}</code></p>\n",
        html_escape(&report.key.answers)
    ));

    if !summary.per_question.is_empty() {
        html.push_str("<h3>Correct rate per question</h3>\n");
        html.push_str(&generate_bar_chart(&summary.per_question));
    }
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Results</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Score</th><th onclick=\"sortTable(2)\">%</th><th onclick=\"sortTable(3)\">Correct</th><th onclick=\"sortTable(4)\">Incorrect</th><th onclick=\"sortTable(5)\">Answers</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for r in &report.results {
        let (source_class, source_text) = if r.placeholder_answers {
            ("placeholder", "placeholder")
        } else {
            ("detected", "detected")
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}/{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            source_class,
            html_escape(&r.name),
            r.score,
            r.total,
            r.percent(),
            index_list(&r.correct),
            index_list(&r.incorrect),
            source_text,
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradingReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(per_question: &BTreeMap<u32, QuestionStats>) -> String {
    let bar_height = 18;
    let max_width = 400;
    let padding = 6;
    let label_width = 60;

    let total_height = per_question.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, stats) in per_question.values().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let rate = stats.correct_rate;
        let width = (rate * max_width as f64) as usize;

        let color = if rate >= 0.8 {
            "#22c55e"
        } else if rate >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">Q{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            stats.question
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"3\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}% ({}/{})</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            rate * 100.0,
            stats.correct,
            stats.attempted
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --warn: #fef3c7; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --warn: #78350f; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: var(--muted); }
.warning { background: var(--warn); padding: 0.75rem 1rem; border-radius: 8px; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
tr.placeholder td { font-style: italic; color: var(--muted); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
