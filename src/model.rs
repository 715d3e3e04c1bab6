//! Uniform in-memory representation of line coverage, independent of any
//! specific input format. Parsers produce a `CoverageData` which is then
//! densified and aggregated into `FileCoverage` rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Compute a coverage rate, returning 1.0 when the total is zero.
///
/// A file with no statements has nothing left to cover, so it reports as
/// fully covered instead of dividing by zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        1.0
    } else {
        covered as f64 / total as f64
    }
}

/// Coverage classification of a single physical source line.
///
/// The variant order is meaningful: when the same line is reported more than
/// once, the greater state wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    /// Blank, comment or otherwise non-executable line.
    #[default]
    NotApplicable,
    Miss,
    Partial,
    Full,
}

impl LineState {
    /// Whether the line counts as a statement.
    #[must_use]
    pub fn is_statement(self) -> bool {
        self != LineState::NotApplicable
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineState::NotApplicable => "not_applicable",
            LineState::Miss => "miss",
            LineState::Partial => "partial",
            LineState::Full => "full",
        }
    }
}

impl fmt::Display for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed range `[start, end]` of consecutive missed line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MissedRange {
    pub start: u32,
    pub end: u32,
}

impl MissedRange {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "range start must not exceed end");
        Self { start, end }
    }

    #[must_use]
    pub fn single(line: u32) -> Self {
        Self::new(line, line)
    }

    /// Number of lines covered by the range.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

impl fmt::Display for MissedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Aggregated statistics for one source file, or for the report footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoverage {
    pub filename: String,
    pub total_statements: u64,
    pub total_full: u64,
    pub total_partial: u64,
    pub total_misses: u64,
    /// Statements with at least half of their instructions executed. Every
    /// full statement counts, partial ones only when the input says so.
    pub total_gehalf: u64,
    /// `total_full / total_statements`, or 1.0 for a file without statements.
    pub line_rate: f64,
    pub missed_lines: Vec<MissedRange>,
    /// Partially covered lines, kept apart from `missed_lines`.
    pub partial_lines: Vec<u32>,
}

impl FileCoverage {
    /// An empty row for `filename`: no statements, fully covered.
    pub fn empty(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            total_statements: 0,
            total_full: 0,
            total_partial: 0,
            total_misses: 0,
            total_gehalf: 0,
            line_rate: rate(0, 0),
            missed_lines: Vec::new(),
            partial_lines: Vec::new(),
        }
    }

    /// Number of individual missed lines across all ranges.
    #[must_use]
    pub fn missed_line_count(&self) -> u64 {
        self.missed_lines.iter().map(|r| u64::from(r.line_count())).sum()
    }
}

/// A single numbered line as reported by an instrumentation format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStatus {
    pub line_number: u32,
    pub state: LineState,
    /// At least half of the line's instructions ran.
    pub gehalf: bool,
}

/// Sparse, numbered line states for a single source file.
#[derive(Debug, Clone, Default)]
pub struct FileLineStatuses {
    pub path: String,
    pub lines: Vec<LineStatus>,
}

impl FileLineStatuses {
    pub fn new(path: String) -> Self {
        Self {
            path,
            ..Default::default()
        }
    }

    /// Record a line whose half-coverage follows from its state alone:
    /// full lines count, partial and missed lines do not.
    pub fn push(&mut self, line_number: u32, state: LineState) {
        self.push_with_gehalf(line_number, state, false);
    }

    /// Record a line with an explicit half-coverage flag. The flag only
    /// matters for partial lines.
    pub fn push_with_gehalf(&mut self, line_number: u32, state: LineState, gehalf: bool) {
        let gehalf = match state {
            LineState::Full => true,
            LineState::Partial => gehalf,
            LineState::Miss | LineState::NotApplicable => false,
        };
        self.lines.push(LineStatus {
            line_number,
            state,
            gehalf,
        });
    }
}

/// The complete result of parsing a single coverage file.
#[derive(Debug, Clone, Default)]
pub struct CoverageData {
    pub files: Vec<FileLineStatuses>,
}

impl CoverageData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge records that refer to the same path, keeping the stronger state
    /// per line; a line is half covered if any record says so. Output is
    /// ordered by path.
    #[must_use]
    pub fn merge_duplicates(self) -> Self {
        let mut by_path: BTreeMap<String, BTreeMap<u32, (LineState, bool)>> = BTreeMap::new();
        for file in self.files {
            let lines = by_path.entry(file.path).or_default();
            for line in file.lines {
                let entry = lines.entry(line.line_number).or_default();
                entry.0 = entry.0.max(line.state);
                entry.1 |= line.gehalf;
            }
        }

        let files = by_path
            .into_iter()
            .map(|(path, lines)| FileLineStatuses {
                path,
                lines: lines
                    .into_iter()
                    .map(|(line_number, (state, gehalf))| LineStatus {
                        line_number,
                        state,
                        gehalf,
                    })
                    .collect(),
            })
            .collect();
        Self { files }
    }
}

/// One physical source line paired with its coverage state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: u32,
    pub state: LineState,
    pub text: String,
}
