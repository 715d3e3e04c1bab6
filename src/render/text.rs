use std::fmt::Write;

use super::{format_missed_lines, format_rate, Renderer};
use crate::model::FileCoverage;
use crate::report::ReportModel;

const HEADERS: [&str; 8] = [
    "Filename",
    "Statements",
    "Full",
    "Partial",
    "GEHalf",
    "Miss",
    "Cover",
    "Missing",
];

/// Plain text table, one row per file followed by the totals row.
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, report: &ReportModel) -> String {
        let cells: Vec<[String; 8]> = report
            .rows
            .iter()
            .chain(std::iter::once(&report.footer))
            .map(row_cells)
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_line(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("  ")).unwrap();
        for row in &cells {
            write_line(&mut out, row, &widths);
        }

        if !report.failed_files.is_empty() {
            out.push('\n');
            for failure in &report.failed_files {
                writeln!(out, "Skipped {}: {}", failure.filename, failure.message).unwrap();
            }
        }
        out
    }
}

fn row_cells(row: &FileCoverage) -> [String; 8] {
    [
        row.filename.clone(),
        row.total_statements.to_string(),
        row.total_full.to_string(),
        row.total_partial.to_string(),
        row.total_gehalf.to_string(),
        row.total_misses.to_string(),
        format_rate(row.line_rate),
        format_missed_lines(&row.missed_lines),
    ]
}

/// Filename and missing columns are left aligned, numbers right aligned.
fn write_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let mut parts = Vec::with_capacity(cells.len());
    for (idx, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if idx == 0 || idx == cells.len() - 1 {
            parts.push(format!("{cell:<width$}"));
        } else {
            parts.push(format!("{cell:>width$}"));
        }
    }
    writeln!(out, "{}", parts.join("  ").trim_end()).unwrap();
}
