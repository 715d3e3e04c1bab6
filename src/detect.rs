//! Input format selection for instrumentation output.
//!
//! The extension is checked first; `.xml` is ambiguous, so the first few KB
//! of content decide the rest.

use std::path::Path;

use clap::ValueEnum;

use crate::error::ReportError;
use crate::parsers::cobertura::CoberturaParser;
use crate::parsers::lcov::LcovParser;
use crate::parsers::Parser;

/// How many leading bytes content sniffing looks at.
const SNIFF_LEN: usize = 4096;

/// Supported coverage input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Cobertura,
    Lcov,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Cobertura => "cobertura",
            Format::Lcov => "lcov",
        }
    }

    /// Parser for this format.
    #[must_use]
    pub fn parser(self) -> Box<dyn Parser> {
        match self {
            Format::Cobertura => Box::new(CoberturaParser),
            Format::Lcov => Box::new(LcovParser),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = ReportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cobertura" | "xml" => Ok(Format::Cobertura),
            "lcov" | "info" => Ok(Format::Lcov),
            _ => Err(ReportError::Parse(format!(
                "Unknown format: '{s}'. Supported: cobertura, lcov"
            ))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the coverage format from filename and file content.
pub fn detect_format(path: &Path, content: &[u8]) -> Option<Format> {
    by_extension(path).or_else(|| by_content(content))
}

fn by_extension(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    matches!(ext.as_str(), "info" | "lcov").then_some(Format::Lcov)
}

fn by_content(content: &[u8]) -> Option<Format> {
    let head = String::from_utf8_lossy(&content[..content.len().min(SNIFF_LEN)]);

    // Tags must start a line; a stray "SF:" inside XML text is not LCOV.
    let mut has_sf = false;
    let mut has_da = false;
    for line in head.lines() {
        has_sf |= line.starts_with("SF:");
        has_da |= line.starts_with("DA:");
    }
    if has_sf && has_da {
        return Some(Format::Lcov);
    }

    let trimmed = head.trim_start();
    if (trimmed.starts_with("<?xml") || trimmed.starts_with('<')) && head.contains("<coverage") {
        return Some(Format::Cobertura);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_lcov_by_extension() {
        assert_eq!(detect_format(Path::new("coverage.info"), b""), Some(Format::Lcov));
        assert_eq!(detect_format(Path::new("out/LCOV.LCOV"), b""), Some(Format::Lcov));
    }

    #[test]
    fn test_detect_lcov_by_content() {
        let content = b"TN:test\nSF:/src/lib.rs\nDA:1,5\nend_of_record\n";
        assert_eq!(detect_format(Path::new("coverage.txt"), content), Some(Format::Lcov));
    }

    #[test]
    fn test_detect_cobertura_by_content() {
        let content = b"<?xml version=\"1.0\"?>\n<coverage version=\"1.0\">";
        assert_eq!(detect_format(Path::new("coverage.xml"), content), Some(Format::Cobertura));
    }

    #[test]
    fn test_xml_without_coverage_root_is_unknown() {
        let content = b"<?xml version=\"1.0\"?>\n<report name=\"jacoco\">";
        assert_eq!(detect_format(Path::new("jacoco.xml"), content), None);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_format(Path::new("random.dat"), b"hello world"), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("LCOV".parse::<Format>().unwrap(), Format::Lcov);
        assert_eq!("cobertura".parse::<Format>().unwrap(), Format::Cobertura);
        assert!("jacoco".parse::<Format>().is_err());
    }
}
