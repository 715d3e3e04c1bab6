//! Command handler functions for the covrep CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregate::{aggregate, densify};
use crate::config::ReportConfig;
use crate::detect::Format;
use crate::ingest;
use crate::render::{format_missed_lines, Renderer};
use crate::report::generate;
use crate::sources::load_sources;

pub fn cmd_report(file: &Path, format: Option<Format>, config: &ReportConfig) -> Result<String> {
    let (data, _format) = ingest::load(file, format)
        .with_context(|| format!("Failed to load coverage from {}", file.display()))?;

    let texts = config.render_sources.then(|| {
        load_sources(
            data.files.iter().map(|f| f.path.as_str()),
            config.source_root.as_deref(),
        )
    });

    let model = generate(data, &config.report_options(), texts.as_ref());
    Ok(config.style.renderer().render(&model))
}

pub fn cmd_uncovered(file: &Path, source_file: &str, format: Option<Format>) -> Result<String> {
    let (data, _format) = ingest::load(file, format)
        .with_context(|| format!("Failed to load coverage from {}", file.display()))?;
    let data = data.merge_duplicates();

    let Some(entry) = data.files.iter().find(|f| f.path == source_file) else {
        return Ok(format!("No coverage data for '{}'\n", source_file));
    };
    let states = densify(entry)?;
    let coverage = aggregate(source_file, &states);

    if coverage.missed_lines.is_empty() && coverage.partial_lines.is_empty() {
        return Ok(format!(
            "All statements are fully covered in '{}'\n",
            source_file
        ));
    }

    let mut out = String::new();
    if !coverage.missed_lines.is_empty() {
        writeln!(out, "Missed lines in '{}':", source_file).unwrap();
        writeln!(out, "  {}", format_missed_lines(&coverage.missed_lines)).unwrap();
        writeln!(out, "  ({} lines)", coverage.missed_line_count()).unwrap();
    }
    if !coverage.partial_lines.is_empty() {
        let partial: Vec<String> = coverage.partial_lines.iter().map(u32::to_string).collect();
        writeln!(out, "Partially covered lines in '{}':", source_file).unwrap();
        writeln!(out, "  {}", partial.join(", ")).unwrap();
    }
    Ok(out)
}
