pub mod cobertura;
pub mod lcov;

use crate::error::Result;
use crate::model::CoverageData;

/// Every format parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into numbered per-line states.
    fn parse(&self, input: &[u8]) -> Result<CoverageData>;
}
