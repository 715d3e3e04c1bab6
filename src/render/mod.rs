//! Projections of a `ReportModel` into text, CSV, Markdown and HTML.
//!
//! Renderers only format: every count, rate and range arrives pre-computed
//! in the model.

mod csv;
mod html;
mod markdown;
mod text;

use clap::ValueEnum;
use serde::Deserialize;

use crate::model::MissedRange;
use crate::report::ReportModel;

pub use self::csv::CsvRenderer;
pub use self::html::HtmlRenderer;
pub use self::markdown::MarkdownRenderer;
pub use self::text::TextRenderer;

/// Trait for rendering a finished report.
pub trait Renderer {
    /// Render the report to a string.
    fn render(&self, report: &ReportModel) -> String;
}

/// Output style, selectable from the CLI or the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Text,
    Csv,
    Markdown,
    Html,
}

impl Style {
    #[must_use]
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Style::Text => Box::new(TextRenderer),
            Style::Csv => Box::new(CsvRenderer),
            Style::Markdown => Box::new(MarkdownRenderer),
            Style::Html => Box::new(HtmlRenderer),
        }
    }
}

/// Format a 0.0–1.0 rate as a percentage with two decimals, e.g. "50.00%".
#[must_use]
pub fn format_rate(line_rate: f64) -> String {
    format!("{:.2}%", line_rate * 100.0)
}

/// Format missed ranges in compact notation, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_missed_lines(ranges: &[MissedRange]) -> String {
    ranges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
