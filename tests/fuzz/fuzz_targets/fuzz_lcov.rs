#![no_main]
use libfuzzer_sys::fuzz_target;

use covrep::parsers::Parser;
use covrep::report::{generate, ReportOptions};

fuzz_target!(|data: &[u8]| {
    // Parsing and report generation must not panic on any input.
    if let Ok(coverage) = covrep::parsers::lcov::LcovParser.parse(data) {
        let _ = generate(coverage, &ReportOptions::default(), None);
    }
});
