use std::fmt::Write;

use super::{format_missed_lines, format_rate, Renderer};
use crate::model::FileCoverage;
use crate::report::ReportModel;

/// Markdown formatter, suitable for pull request comments.
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, report: &ReportModel) -> String {
        let mut md = String::new();
        let footer = &report.footer;

        writeln!(md, "### {}\n", report.title).unwrap();
        writeln!(
            md,
            "**{}** of **{}** statements fully covered ({}), {} partial, {} at least half covered, {} missed\n",
            footer.total_full,
            footer.total_statements,
            format_rate(footer.line_rate),
            footer.total_partial,
            footer.total_gehalf,
            footer.total_misses,
        )
        .unwrap();

        if report.rows.is_empty() {
            md.push_str("No files were reported.\n");
        } else {
            md.push_str("| File | Statements | Full | Partial | GEHalf | Miss | Cover | Missing |\n");
            md.push_str("|:-----|-----------:|-----:|--------:|-------:|-----:|------:|:--------|\n");
            for row in &report.rows {
                table_row(&mut md, &format!("`{}`", row.filename), row);
            }
            table_row(&mut md, &format!("**{}**", footer.filename), footer);
        }

        if !report.failed_files.is_empty() {
            md.push_str("\n<details>\n<summary>Skipped files</summary>\n\n");
            for failure in &report.failed_files {
                writeln!(md, "- `{}`: {}", failure.filename, failure.message).unwrap();
            }
            md.push_str("\n</details>\n");
        }

        md
    }
}

fn table_row(md: &mut String, name: &str, row: &FileCoverage) {
    writeln!(
        md,
        "| {name} | {} | {} | {} | {} | {} | {} | {} |",
        row.total_statements,
        row.total_full,
        row.total_partial,
        row.total_gehalf,
        row.total_misses,
        format_rate(row.line_rate),
        format_missed_lines(&row.missed_lines),
    )
    .unwrap();
}
