//! Report model construction: sorted per-file rows, a totals footer and the
//! optional annotated sources, fully resolved for a renderer to project.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{aggregate_all, FileFailure};
use crate::model::{rate, CoverageData, FileCoverage, LineState, SourceLine};

/// Version of the serialized `ReportModel` shape.
pub const SCHEMA_VERSION: u32 = 1;

/// Filename used for the synthetic totals row.
pub const FOOTER_LABEL: &str = "TOTAL";

pub const DEFAULT_TITLE: &str = "Coverage report";

pub const DEFAULT_NO_SOURCES_MESSAGE: &str = "Rendering of source files was disabled.";

/// Everything a renderer needs, computed once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    pub schema_version: u32,
    pub title: String,
    /// Ordered by filename (byte order).
    pub rows: Vec<FileCoverage>,
    /// Counts summed over `rows`; `missed_lines` is always empty.
    pub footer: FileCoverage,
    pub sources: Option<BTreeMap<String, Vec<SourceLine>>>,
    pub no_sources_message: String,
    /// Files that could not be aggregated and are absent from `rows`.
    pub failed_files: Vec<FileFailure>,
}

/// What to show in a file's source block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceView<'a> {
    Lines(&'a [SourceLine]),
    Fallback(&'a str),
}

impl ReportModel {
    /// Source block for `filename`. Falls back per file, so a file missing
    /// from `sources` does not hide the blocks of the others.
    #[must_use]
    pub fn source_view(&self, filename: &str) -> SourceView<'_> {
        match self
            .sources
            .as_ref()
            .and_then(|sources| sources.get(filename))
        {
            Some(lines) => SourceView::Lines(lines),
            None => SourceView::Fallback(&self.no_sources_message),
        }
    }

    /// Whether any annotated source is available at all.
    #[must_use]
    pub fn has_sources(&self) -> bool {
        self.sources.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Build the report model from already aggregated rows. A blank
/// `no_sources_message` is replaced by `DEFAULT_NO_SOURCES_MESSAGE` so a
/// fallback block is never empty.
pub fn build(
    title: &str,
    mut file_coverages: Vec<FileCoverage>,
    sources: Option<BTreeMap<String, Vec<SourceLine>>>,
    no_sources_message: &str,
) -> ReportModel {
    file_coverages.sort_by(row_order);
    let footer = footer(&file_coverages);
    let no_sources_message = if no_sources_message.trim().is_empty() {
        DEFAULT_NO_SOURCES_MESSAGE
    } else {
        no_sources_message
    };

    ReportModel {
        schema_version: SCHEMA_VERSION,
        title: title.to_string(),
        rows: file_coverages,
        footer,
        sources,
        no_sources_message: no_sources_message.to_string(),
        failed_files: Vec::new(),
    }
}

/// Totals row: counts are summed and the rate is recomputed from the sums,
/// never averaged over per-file rates.
#[must_use]
pub fn footer(rows: &[FileCoverage]) -> FileCoverage {
    let mut total = FileCoverage::empty(FOOTER_LABEL);
    for row in rows {
        total.total_statements += row.total_statements;
        total.total_full += row.total_full;
        total.total_partial += row.total_partial;
        total.total_misses += row.total_misses;
        total.total_gehalf += row.total_gehalf;
    }
    total.line_rate = rate(total.total_full, total.total_statements);
    total
}

/// Filename first, then the remaining fields so duplicate filenames still
/// order the same way whatever the input order.
fn row_order(a: &FileCoverage, b: &FileCoverage) -> Ordering {
    a.filename
        .cmp(&b.filename)
        .then_with(|| a.total_statements.cmp(&b.total_statements))
        .then_with(|| a.total_full.cmp(&b.total_full))
        .then_with(|| a.total_partial.cmp(&b.total_partial))
        .then_with(|| a.total_misses.cmp(&b.total_misses))
        .then_with(|| a.total_gehalf.cmp(&b.total_gehalf))
        .then_with(|| a.missed_lines.cmp(&b.missed_lines))
        .then_with(|| a.partial_lines.cmp(&b.partial_lines))
}

/// Pair each physical line of `text` with its state. Lines beyond the end of
/// `line_states` are not applicable.
#[must_use]
pub fn annotate_source(text: &str, line_states: &[LineState]) -> Vec<SourceLine> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| SourceLine {
            number: idx as u32 + 1,
            state: line_states.get(idx).copied().unwrap_or_default(),
            text: line.to_string(),
        })
        .collect()
}

/// Options for a full report generation run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub render_sources: bool,
    pub no_sources_message: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            render_sources: true,
            no_sources_message: DEFAULT_NO_SOURCES_MESSAGE.to_string(),
        }
    }
}

/// Run the whole pipeline over parsed coverage data: merge duplicate paths,
/// aggregate every file, annotate the sources that were supplied and build
/// the model. Files that fail aggregation are listed in `failed_files`.
///
/// `source_texts` maps filenames to their literal text; reading it is the
/// caller's job.
pub fn generate(
    data: CoverageData,
    options: &ReportOptions,
    source_texts: Option<&BTreeMap<String, String>>,
) -> ReportModel {
    let data = data.merge_duplicates();
    debug!(files = data.files.len(), "aggregating coverage");
    let outcome = aggregate_all(&data.files);

    let sources = match source_texts {
        Some(texts) if options.render_sources => Some(
            outcome
                .files
                .iter()
                .filter_map(|file| {
                    let filename = &file.coverage.filename;
                    texts
                        .get(filename)
                        .map(|text| (filename.clone(), annotate_source(text, &file.line_states)))
                })
                .collect::<BTreeMap<_, _>>(),
        ),
        _ => None,
    };

    let rows = outcome.files.into_iter().map(|f| f.coverage).collect();
    let mut model = build(&options.title, rows, sources, &options.no_sources_message);
    model.failed_files = outcome.failures;
    model.failed_files.sort_by(|a, b| a.filename.cmp(&b.filename));

    info!(
        files = model.rows.len(),
        failed = model.failed_files.len(),
        line_rate = model.footer.line_rate,
        "report built"
    );
    model
}
