//! Response-code configuration.
//!
//! # Design
//! A transport owns its `TransportConfig`; nothing here is process-wide, so
//! two transports can classify the same status differently. Only the OK set
//! is configured. A code is an error exactly when it is not OK, which keeps
//! `is_ok` and `is_error` complementary for every status.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use thiserror::Error;

/// A set of HTTP status codes.
///
/// Parsed from exact codes (`"204"`), inclusive ranges (`"200-299"`) and
/// status classes (`"2xx"`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeSet {
    ranges: Vec<RangeInclusive<u16>>,
}

impl CodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            ranges: codes.into_iter().map(|code| code..=code).collect(),
        }
    }

    pub fn with_range(mut self, range: RangeInclusive<u16>) -> Self {
        self.ranges.push(range);
        self
    }

    pub fn contains(&self, code: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(&code))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status code pattern: {0:?}")]
pub struct ParseCodeError(String);

fn parse_code(s: &str, pattern: &str) -> Result<u16, ParseCodeError> {
    match s.trim().parse::<u16>() {
        Ok(code) if (100..=999).contains(&code) => Ok(code),
        _ => Err(ParseCodeError(pattern.to_string())),
    }
}

/// Parse a single pattern into an inclusive range.
fn parse_pattern(pattern: &str) -> Result<RangeInclusive<u16>, ParseCodeError> {
    let trimmed = pattern.trim();

    if let Some(class) = trimmed.strip_suffix("xx").or_else(|| trimmed.strip_suffix("XX")) {
        let digit = match class.parse::<u16>() {
            Ok(digit) if (1..=9).contains(&digit) && class.len() == 1 => digit,
            _ => return Err(ParseCodeError(pattern.to_string())),
        };
        return Ok(digit * 100..=digit * 100 + 99);
    }

    if let Some((low, high)) = trimmed.split_once('-') {
        let low = parse_code(low, pattern)?;
        let high = parse_code(high, pattern)?;
        if low > high {
            return Err(ParseCodeError(pattern.to_string()));
        }
        return Ok(low..=high);
    }

    let code = parse_code(trimmed, pattern)?;
    Ok(code..=code)
}

impl FromStr for CodeSet {
    type Err = ParseCodeError;

    /// Comma-separated patterns, e.g. `"200-299,304"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranges = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse_pattern)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPattern {
    Code(u16),
    Pattern(String),
}

impl<'de> Deserialize<'de> for CodeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<RawPattern>::deserialize(deserializer)?;
        let mut ranges = Vec::with_capacity(raw.len());
        for item in raw {
            let range = match item {
                RawPattern::Code(code) => parse_pattern(&code.to_string()),
                RawPattern::Pattern(pattern) => parse_pattern(&pattern),
            }
            .map_err(de::Error::custom)?;
            ranges.push(range);
        }
        Ok(Self { ranges })
    }
}

/// Per-transport classification settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// Status codes that produce a success response.
    #[serde(default = "default_ok_codes")]
    pub ok_codes: CodeSet,
}

fn default_ok_codes() -> CodeSet {
    CodeSet::new().with_range(200..=299)
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ok_codes: default_ok_codes(),
        }
    }
}

impl TransportConfig {
    pub fn with_ok_codes(ok_codes: CodeSet) -> Self {
        Self { ok_codes }
    }

    pub fn is_ok(&self, code: u16) -> bool {
        self.ok_codes.contains(code)
    }

    pub fn is_error(&self, code: u16) -> bool {
        !self.is_ok(code)
    }
}
