//! Reading source text for annotated source blocks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Resolve a reported filename against an optional source root.
#[must_use]
pub fn resolve_path(filename: &str, source_root: Option<&Path>) -> PathBuf {
    let path = Path::new(filename);
    match source_root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

/// Read the text of every file that can be found. Unreadable files are
/// logged and left out; their report rows fall back to the no-sources
/// message.
pub fn load_sources<'a>(
    filenames: impl IntoIterator<Item = &'a str>,
    source_root: Option<&Path>,
) -> BTreeMap<String, String> {
    let mut texts = BTreeMap::new();
    for filename in filenames {
        let path = resolve_path(filename, source_root);
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(path = %path.display(), "read source");
                texts.insert(
                    filename.to_string(),
                    String::from_utf8_lossy(&bytes).into_owned(),
                );
            }
            Err(e) => warn!(path = %path.display(), "source text unavailable: {e}"),
        }
    }
    texts
}
