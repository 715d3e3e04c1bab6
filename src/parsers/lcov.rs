/// Parser for the LCOV `.info` format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Records used:
///   SF:<path to source file>
///   DA:<line number>,<execution count>[,<checksum>]
///   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
///   end_of_record
///
/// A hit line with at least one untaken branch arm is partial, and counts as
/// half covered when at least half of its arms were taken.
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

use crate::error::Result;
use crate::model::*;
use crate::parsers::Parser;

/// LCOV format parser.
pub struct LcovParser;

impl Parser for LcovParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageData> {
        parse(input)
    }
}

/// Parse LCOV format coverage data from raw bytes.
pub fn parse(input: &[u8]) -> Result<CoverageData> {
    let mut data = CoverageData::new();
    parse_reader(&mut &*input, &mut |file| data.files.push(file))?;
    Ok(data)
}

/// Per-record accumulator, flushed on `end_of_record`.
struct Record {
    path: String,
    hits: BTreeMap<u32, u64>,
    /// Per line: (taken arms, total arms).
    branches: HashMap<u32, (u32, u32)>,
}

impl Record {
    fn finish(self) -> FileLineStatuses {
        let mut file = FileLineStatuses::new(self.path);
        for (line_number, hits) in self.hits {
            if hits == 0 {
                file.push(line_number, LineState::Miss);
                continue;
            }
            match self.branches.get(&line_number) {
                Some(&(taken, total)) if taken < total => file.push_with_gehalf(
                    line_number,
                    LineState::Partial,
                    u64::from(taken) * 2 >= u64::from(total),
                ),
                _ => file.push(line_number, LineState::Full),
            }
        }
        file
    }
}

/// Reads line-by-line and calls `emit` once per `end_of_record`.
fn parse_reader(reader: &mut dyn BufRead, emit: &mut dyn FnMut(FileLineStatuses)) -> Result<()> {
    let mut current: Option<Record> = None;

    let mut raw_line = String::new();
    loop {
        raw_line.clear();
        if reader.read_line(&mut raw_line)? == 0 {
            break; // EOF
        }

        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some(record) = current.take() {
                emit(record.finish());
            }
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };

        match tag {
            "SF" => {
                if let Some(record) = current.take() {
                    emit(record.finish());
                }
                current = Some(Record {
                    path: value.to_string(),
                    hits: BTreeMap::new(),
                    branches: HashMap::new(),
                });
            }
            "DA" => {
                // Negative counts mark non-instrumentable lines; skip them.
                if let Some(record) = current.as_mut() {
                    let mut parts = value.splitn(3, ',');
                    let line_number = parts.next().and_then(|p| p.parse::<u32>().ok());
                    let count = parts.next().and_then(|p| p.parse::<i64>().ok());
                    if let (Some(line_number), Some(count)) = (line_number, count) {
                        if count >= 0 {
                            let hits = record.hits.entry(line_number).or_insert(0);
                            *hits = hits.saturating_add(count as u64);
                        }
                    }
                }
            }
            "BRDA" => {
                if let Some(record) = current.as_mut() {
                    let parts: Vec<&str> = value.splitn(4, ',').collect();
                    if parts.len() == 4 {
                        if let Ok(line_number) = parts[0].parse::<u32>() {
                            let taken = parts[3].parse::<u64>().unwrap_or(0);
                            let arms = record.branches.entry(line_number).or_insert((0, 0));
                            arms.1 = arms.1.saturating_add(1);
                            if taken > 0 {
                                arms.0 = arms.0.saturating_add(1);
                            }
                        }
                    }
                }
            }
            // TN, FN, FNDA, LF, LH, BRF, BRH carry nothing line states need.
            _ => {}
        }
    }

    // Tolerate a missing trailing end_of_record.
    if let Some(record) = current.take() {
        emit(record.finish());
    }
    Ok(())
}
