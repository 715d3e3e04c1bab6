//! Per-file aggregation: turns a dense, 1-indexed sequence of line states
//! into statement counts, a line rate and the ordered missed-line ranges.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::error::{ReportError, Result};
use crate::model::{rate, FileCoverage, FileLineStatuses, LineState, MissedRange};

/// Aggregate one file. Index `i` of `line_states` is physical line `i + 1`.
///
/// An empty sequence is valid and yields an empty, fully covered row. States
/// alone only show that full lines are half covered, so `total_gehalf` equals
/// `total_full` here; `aggregate_all` fills in the flags the input carried.
#[must_use]
pub fn aggregate(filename: &str, line_states: &[LineState]) -> FileCoverage {
    let mut coverage = FileCoverage::empty(filename);
    let mut open: Option<MissedRange> = None;

    for (idx, &state) in line_states.iter().enumerate() {
        let line = idx as u32 + 1;
        match state {
            LineState::NotApplicable => {}
            LineState::Miss => coverage.total_misses += 1,
            LineState::Partial => {
                coverage.total_partial += 1;
                coverage.partial_lines.push(line);
            }
            LineState::Full => coverage.total_full += 1,
        }

        if state == LineState::Miss {
            match open.as_mut() {
                Some(range) => range.end = line,
                None => open = Some(MissedRange::single(line)),
            }
        } else if let Some(range) = open.take() {
            coverage.missed_lines.push(range);
        }
    }
    if let Some(range) = open {
        coverage.missed_lines.push(range);
    }

    coverage.total_statements = coverage.total_full + coverage.total_partial + coverage.total_misses;
    coverage.total_gehalf = coverage.total_full;
    coverage.line_rate = rate(coverage.total_full, coverage.total_statements);
    coverage
}

/// Number of distinct lines of `file` that are at least half covered.
#[must_use]
pub fn gehalf_count(file: &FileLineStatuses) -> u64 {
    let lines: BTreeSet<u32> = file
        .lines
        .iter()
        .filter(|l| l.gehalf)
        .map(|l| l.line_number)
        .collect();
    lines.len() as u64
}

/// Largest line number accepted when densifying.
pub const MAX_LINE_NUMBER: u32 = 10_000_000;

/// Turn sparse numbered line states into the dense sequence `aggregate`
/// expects, filling gaps with `NotApplicable`. Duplicate line numbers keep
/// the stronger state.
pub fn densify(file: &FileLineStatuses) -> Result<Vec<LineState>> {
    if file.path.is_empty() {
        return Err(ReportError::InvalidInput(
            "file entry has an empty filename".to_string(),
        ));
    }
    if let Some(bad) = file.lines.iter().find(|l| l.line_number == 0) {
        return Err(ReportError::InvalidInput(format!(
            "line numbers are 1-based, got {} in '{}'",
            bad.line_number, file.path
        )));
    }

    if let Some(bad) = file.lines.iter().find(|l| l.line_number > MAX_LINE_NUMBER) {
        return Err(ReportError::InvalidInput(format!(
            "line number {} in '{}' exceeds {MAX_LINE_NUMBER}",
            bad.line_number, file.path
        )));
    }

    let len = file.lines.iter().map(|l| l.line_number).max().unwrap_or(0) as usize;
    let mut states = vec![LineState::NotApplicable; len];
    for line in &file.lines {
        let slot = &mut states[line.line_number as usize - 1];
        *slot = (*slot).max(line.state);
    }
    Ok(states)
}

/// A successfully aggregated file together with the dense states it was
/// built from (needed later to annotate source text).
#[derive(Debug, Clone)]
pub struct AggregatedFile {
    pub coverage: FileCoverage,
    pub line_states: Vec<LineState>,
}

/// A file whose input could not be aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub filename: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub files: Vec<AggregatedFile>,
    pub failures: Vec<FileFailure>,
}

/// Aggregate every file independently and in parallel. A malformed file is
/// recorded as a failure and does not stop the others.
pub fn aggregate_all(files: &[FileLineStatuses]) -> AggregateOutcome {
    let results: Vec<std::result::Result<AggregatedFile, FileFailure>> = files
        .par_iter()
        .map(|file| {
            densify(file)
                .map(|line_states| {
                    let mut coverage = aggregate(&file.path, &line_states);
                    coverage.total_gehalf = gehalf_count(file);
                    AggregatedFile {
                        coverage,
                        line_states,
                    }
                })
                .map_err(|e| FileFailure {
                    filename: file.path.clone(),
                    message: e.to_string(),
                })
        })
        .collect();

    let mut outcome = AggregateOutcome::default();
    for result in results {
        match result {
            Ok(file) => outcome.files.push(file),
            Err(failure) => {
                warn!(file = %failure.filename, "skipping file: {}", failure.message);
                outcome.failures.push(failure);
            }
        }
    }
    outcome
}
