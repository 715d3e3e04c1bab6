/// Parser for Cobertura XML coverage reports.
///
/// Cobertura XML structure:
///   <coverage>
///     <sources><source>...</source></sources>
///     <packages>
///       <package name="...">
///         <classes>
///           <class name="..." filename="...">
///             <methods>
///               <method name="...">
///                 <lines><line number="..." hits="..." .../></lines>
///               </method>
///             </methods>
///             <lines>
///               <line number="..." hits="..." [full="0|1"] [gehalf="0|1"]
///                     branch="true|false" condition-coverage="50% (1/2)" />
///             </lines>
///           </class>
///         </classes>
///       </package>
///     </packages>
///   </coverage>
///
/// The optional `full` and `gehalf` attributes are written by checked-coverage
/// tools and take precedence over branch data when deciding full vs. partial
/// and whether a partial line is at least half covered.
use std::collections::HashMap;
use std::str;
use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use regex::Regex;

/// Pre-compiled regex for condition-coverage attributes like "75% (3/4)".
static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)/(\d+)\)").unwrap());

use crate::error::{ReportError, Result};
use crate::model::*;
use crate::parsers::Parser;

pub struct CoberturaParser;

impl Parser for CoberturaParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageData> {
        parse_cobertura(input)
    }
}

fn parse_cobertura(input: &[u8]) -> Result<CoverageData> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut data = CoverageData::new();
    let mut buf = Vec::new();

    let mut current_file: Option<FileLineStatuses> = None;

    // Source prefix from <source> elements
    let mut sources: Vec<String> = Vec::new();
    let mut in_source = false;

    loop {
        let event = reader.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(source) => {
                return Err(ReportError::Xml {
                    source,
                    position: reader.buffer_position(),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.name().as_ref() {
                    b"source" => {
                        // Self-closing <source/> has no text and no End event.
                        if is_start_event {
                            in_source = true;
                        }
                    }
                    b"class" => {
                        let attrs = attr_map(e);
                        if let Some(filename) = attrs.get("filename") {
                            let path = resolve_source_path(filename, &sources);
                            current_file = Some(FileLineStatuses::new(path));
                        }
                    }
                    b"line" => {
                        let attrs = attr_map(e);
                        if let Some(file) = current_file.as_mut() {
                            // Lines may appear under both <method> and <class>;
                            // duplicates are merged later, keeping the stronger state.
                            if let Some(line_number) =
                                attrs.get("number").and_then(|n| n.parse::<u32>().ok())
                            {
                                let (state, gehalf) = line_state(&attrs);
                                file.push_with_gehalf(line_number, state, gehalf);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_source {
                    if let Ok(text) = e.unescape() {
                        sources.push(text.to_string());
                    }
                    in_source = false;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"source" => {
                    in_source = false;
                }
                b"class" => {
                    if let Some(file) = current_file.take() {
                        data.files.push(file);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    // Handle unclosed file
    if let Some(file) = current_file.take() {
        data.files.push(file);
    }

    Ok(data)
}

/// Classify a `<line>` element from its attributes. The flag tells whether
/// at least half of the line ran; it only matters for partial lines.
fn line_state(attrs: &HashMap<String, String>) -> (LineState, bool) {
    let hits = attrs
        .get("hits")
        .and_then(|h| h.parse::<u64>().ok())
        .unwrap_or(0);
    if hits == 0 {
        return (LineState::Miss, false);
    }

    let gehalf = attrs.get("gehalf").map(|v| v == "1");
    match attrs.get("full").map(String::as_str) {
        Some("1") => return (LineState::Full, true),
        Some("0") => return (LineState::Partial, gehalf.unwrap_or(false)),
        _ => {}
    }

    let is_branch = attrs.get("branch").is_some_and(|v| v == "true");
    if is_branch {
        if let Some(caps) = attrs
            .get("condition-coverage")
            .and_then(|cond| BRANCH_RE.captures(cond))
        {
            let covered: u32 = caps[1].parse().unwrap_or(0);
            let total: u32 = caps[2].parse().unwrap_or(0);
            if covered < total {
                let half = u64::from(covered) * 2 >= u64::from(total);
                return (LineState::Partial, gehalf.unwrap_or(half));
            }
        }
    }
    (LineState::Full, true)
}

/// Resolve a filename against the list of `<source>` prefixes.
///
/// - If the filename is already absolute, return it as-is.
/// - Otherwise, prepend the first non-empty source prefix.
/// - If no non-empty sources exist, return the filename unchanged.
fn resolve_source_path(filename: &str, sources: &[String]) -> String {
    if filename.starts_with('/') {
        return filename.to_string();
    }
    for source in sources {
        let base = source.trim_end_matches('/');
        if !base.is_empty() {
            return format!("{}/{}", base, filename);
        }
    }
    filename.to_string()
}

/// Extract attributes from an XML element into a HashMap.
fn attr_map(e: &quick_xml::events::BytesStart) -> HashMap<String, String> {
    e.attributes()
        .filter_map(|a| {
            let attr = a.ok()?;
            let key = str::from_utf8(attr.key.local_name().into_inner())
                .ok()?
                .to_string();
            let value = attr.unescape_value().ok()?.to_string();
            Some((key, value))
        })
        .collect()
}
