use std::fmt::Write;

use super::{format_missed_lines, format_rate, Renderer};
use crate::model::{FileCoverage, LineState};
use crate::report::{ReportModel, SourceView};

const TEMPLATE: &str = include_str!("templates/report.html");

/// Self-contained HTML page: summary table plus one anchored source block
/// per file.
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, report: &ReportModel) -> String {
        let title = escape_html(&report.title);
        let rows = build_rows(report);
        let footer = summary_row(&report.footer, false);
        let failures = build_failures(report);
        let sources = build_sources(report);
        let report_json = build_report_json(report);

        fill_template(
            TEMPLATE,
            &[
                ("TITLE", &title),
                ("ROWS", &rows),
                ("FOOTER", &footer),
                ("FAILURES", &failures),
                ("SOURCES", &sources),
                ("REPORT_JSON", &report_json),
            ],
        )
    }
}

/// Substitute `{{KEY}}` placeholders in a single pass, so substituted text
/// is never scanned again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replaced = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, &after[end + 2..]))
        });
        match replaced {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn build_rows(report: &ReportModel) -> String {
    let mut rows = String::new();
    for row in &report.rows {
        rows.push_str(&summary_row(row, true));
        rows.push('\n');
    }
    rows
}

fn summary_row(row: &FileCoverage, link: bool) -> String {
    let name = escape_html(&row.filename);
    let name_cell = if link {
        format!(r##"<a href="#{name}">{name}</a>"##)
    } else {
        name
    };
    format!(
        r#"<tr><td class="path">{name_cell}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td>{}</td></tr>"#,
        row.total_statements,
        row.total_full,
        row.total_partial,
        row.total_gehalf,
        row.total_misses,
        format_rate(row.line_rate),
        format_missed_lines(&row.missed_lines),
    )
}

fn build_failures(report: &ReportModel) -> String {
    if report.failed_files.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"failures\">\n");
    for failure in &report.failed_files {
        writeln!(
            out,
            "<li><code>{}</code>: {}</li>",
            escape_html(&failure.filename),
            escape_html(&failure.message)
        )
        .unwrap();
    }
    out.push_str("</ul>");
    out
}

fn build_sources(report: &ReportModel) -> String {
    let mut out = String::new();
    for row in &report.rows {
        let name = escape_html(&row.filename);
        writeln!(out, r#"<div class="source" id="{name}">"#).unwrap();
        writeln!(out, "<h3>{name}</h3>").unwrap();
        match report.source_view(&row.filename) {
            SourceView::Lines(lines) => {
                out.push_str("<table class=\"code\">\n");
                for line in lines {
                    writeln!(
                        out,
                        r#"<tr class="{}"><td class="lineno">{}</td><td><pre>{}</pre></td></tr>"#,
                        state_class(line.state),
                        line.number,
                        escape_html(&line.text)
                    )
                    .unwrap();
                }
                out.push_str("</table>\n");
            }
            SourceView::Fallback(message) => {
                writeln!(out, r#"<p class="no-source">{}</p>"#, escape_html(message)).unwrap();
            }
        }
        out.push_str("</div>\n");
    }
    out
}

fn state_class(state: LineState) -> &'static str {
    match state {
        LineState::NotApplicable => "",
        other => other.as_str(),
    }
}

fn build_report_json(report: &ReportModel) -> String {
    // Escape < and > so embedded source text cannot close the script tag.
    serde_json::to_string(report)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::LineState::*;
    use crate::report::{annotate_source, build};

    #[test]
    fn test_escape_html_encodes_special_chars() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_fill_template_single_pass() {
        let out = fill_template("{{A}}-{{B}}-{{C}}", &[("A", "{{B}}"), ("B", "b")]);
        assert_eq!(out, "{{B}}-b-{{C}}");
    }

    #[test]
    fn test_fill_template_unterminated() {
        assert_eq!(fill_template("x {{A", &[("A", "a")]), "x {{A");
    }

    #[test]
    fn test_html_renders_summary_and_sources() {
        let rows = vec![
            aggregate("a.py", &[Full, Miss, Partial]),
            aggregate("b.py", &[Full]),
        ];
        let mut sources = BTreeMap::new();
        sources.insert(
            "a.py".to_string(),
            annotate_source("x = 1\nif x < 2:\n  y()\n", &[Full, Miss, Partial]),
        );
        let html = HtmlRenderer.render(&build("Report <1>", rows, Some(sources), "disabled"));

        assert!(html.contains("<title>Report &lt;1&gt;</title>"));
        assert!(html.contains(r##"<a href="#a.py">a.py</a>"##));
        assert!(html.contains(r#"<div class="source" id="a.py">"#));
        assert!(html.contains(r#"<tr class="full"><td class="lineno">1</td><td><pre>x = 1</pre></td></tr>"#));
        assert!(html.contains(r#"<tr class="miss"><td class="lineno">2</td><td><pre>if x &lt; 2:</pre></td></tr>"#));
        assert!(html.contains(r#"<tr class="partial">"#));
        assert!(html.contains(r#"<p class="no-source">disabled</p>"#));
        assert!(html.contains(r#"<td class="path">TOTAL</td><td class="num">4</td><td class="num">2</td><td class="num">1</td><td class="num">2</td><td class="num">1</td>"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_html_without_sources_uses_fallback_for_every_row() {
        let rows = vec![aggregate("a.py", &[Full]), aggregate("b.py", &[Miss])];
        let html = HtmlRenderer.render(&build("t", rows, None, "No sources."));
        assert_eq!(html.matches(r#"<p class="no-source">No sources.</p>"#).count(), 2);
    }

    #[test]
    fn test_report_json_escapes_angle_brackets() {
        let rows = vec![aggregate("<script>.py", &[Full])];
        let json = build_report_json(&build("t", rows, None, ""));
        assert!(!json.contains('<'));
        assert!(json.contains("\\u003cscript\\u003e.py"));
    }
}
