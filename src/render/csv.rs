use super::{format_rate, Renderer};
use crate::model::FileCoverage;
use crate::report::ReportModel;

/// Comma separated summary: one record per file plus the totals record.
pub struct CsvRenderer;

impl Renderer for CsvRenderer {
    fn render(&self, report: &ReportModel) -> String {
        let mut wtr = ::csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(Vec::new());

        wtr.write_record([
            "Filename",
            "Statements",
            "Full",
            "Partial",
            "GEHalf",
            "Missed",
            "Covered",
        ])
        .expect("writing CSV into a Vec cannot fail");
        for row in report.rows.iter().chain(std::iter::once(&report.footer)) {
            wtr.write_record(record(row))
                .expect("writing CSV into a Vec cannot fail");
        }

        let bytes = wtr
            .into_inner()
            .expect("flushing CSV into a Vec cannot fail");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn record(row: &FileCoverage) -> [String; 7] {
    [
        row.filename.clone(),
        row.total_statements.to_string(),
        row.total_full.to_string(),
        row.total_partial.to_string(),
        row.total_gehalf.to_string(),
        row.total_misses.to_string(),
        format_rate(row.line_rate),
    ]
}
