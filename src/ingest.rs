use std::path::Path;

use tracing::{debug, info};

use crate::detect::{detect_format, Format};
use crate::error::{ReportError, Result};
use crate::model::CoverageData;
use crate::parsers::Parser;

/// Read a coverage file, auto-detect its format (or use the override) and
/// parse it into numbered line states. Returns the data and the format used.
pub fn load(file_path: &Path, format_override: Option<Format>) -> Result<(CoverageData, Format)> {
    let content = std::fs::read(file_path)?;

    let format = match format_override {
        Some(format) => format,
        None => detect_format(file_path, &content).ok_or(ReportError::UnknownFormat)?,
    };
    debug!(path = %file_path.display(), %format, bytes = content.len(), "parsing coverage file");

    let data = format.parser().parse(&content)?;
    info!(path = %file_path.display(), %format, files = data.files.len(), "loaded coverage");
    Ok((data, format))
}
