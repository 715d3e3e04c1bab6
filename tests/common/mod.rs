#![allow(dead_code)]

use std::path::{Path, PathBuf};

use covrep::model::{CoverageData, FileLineStatuses, LineState};

/// Write `content` to `name` inside `dir`, returning the full path.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Build parsed coverage data from dense per-file states (line 1 first).
pub fn coverage_data(files: &[(&str, &[LineState])]) -> CoverageData {
    let files = files
        .iter()
        .map(|(path, states)| {
            let mut file = FileLineStatuses::new(path.to_string());
            for (idx, state) in states.iter().enumerate() {
                if state.is_statement() {
                    file.push(idx as u32 + 1, *state);
                }
            }
            file
        })
        .collect();
    CoverageData { files }
}
