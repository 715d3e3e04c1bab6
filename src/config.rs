//! Optional `covrep.toml` configuration, overridden by CLI flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::render::Style;
use crate::report::{ReportOptions, DEFAULT_NO_SOURCES_MESSAGE, DEFAULT_TITLE};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "covrep.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub title: String,
    pub render_sources: bool,
    pub no_sources_message: String,
    /// Prefix for relative filenames when reading source text.
    pub source_root: Option<PathBuf>,
    pub style: Style,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            render_sources: true,
            no_sources_message: DEFAULT_NO_SOURCES_MESSAGE.to_string(),
            source_root: None,
            style: Style::default(),
        }
    }
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub no_source: bool,
    pub source_root: Option<PathBuf>,
    pub style: Option<Style>,
}

impl ReportConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ReportError::Config(e.to_string()))?;
        if config.no_sources_message.trim().is_empty() {
            return Err(ReportError::Config(
                "no_sources_message must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml(&text)
    }

    /// Load `explicit` if given (it must exist), otherwise `covrep.toml` in
    /// `dir` when present, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn merge_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if overrides.no_source {
            self.render_sources = false;
        }
        if let Some(root) = overrides.source_root {
            self.source_root = Some(root);
        }
        if let Some(style) = overrides.style {
            self.style = style;
        }
        self
    }

    #[must_use]
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: self.title.clone(),
            render_sources: self.render_sources,
            no_sources_message: self.no_sources_message.clone(),
        }
    }
}
