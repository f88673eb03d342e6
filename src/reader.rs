//! Line-level parsing of text trajectories.
//!
//! A trajectory is a sequence of records. A record starts with a header line, which begins with
//! the [`HEADER_MARKER`], and is followed by one `x y z` line per atom.
//!
//! Lines are handled as raw bytes. Headers are opaque labels and anything before the first header
//! is skipped, so neither has to be valid UTF-8. Only coordinate lines are decoded.
use glam::DVec3;

use crate::error::{Error, Result};

pub const HEADER_MARKER: u8 = b'>';

/// How to treat coordinate lines that do not hold exactly three real numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Parsing {
    /// Reject any malformed coordinate line with [`Error::Parse`].
    #[default]
    Strict,
    /// Read as many leading values as possible and default the rest to zero. Trailing tokens
    /// after the third value are ignored.
    Lenient,
}

/// The kind of a single line, with its line terminator already stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'l> {
    /// A frame boundary. Holds the raw bytes after the marker, see [`header_token`].
    Header(&'l [u8]),
    Coords(&'l [u8]),
    Blank,
}

pub fn classify(line: &[u8]) -> Line<'_> {
    // Only a marker in the very first column opens a new frame.
    if let Some((&HEADER_MARKER, token)) = line.split_first() {
        Line::Header(token)
    } else if line.iter().all(u8::is_ascii_whitespace) {
        Line::Blank
    } else {
        Line::Coords(line)
    }
}

/// Turn the raw bytes after a header marker into a label.
///
/// Invalid UTF-8 is replaced, never rejected.
pub fn header_token(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}

/// Parse a coordinate line into a position.
///
/// The `lineno` is only used for diagnostics.
pub fn parse_coords(content: &[u8], lineno: usize, parsing: Parsing) -> Result<DVec3> {
    let decoded = String::from_utf8_lossy(content);
    let invalid = || Error::Parse {
        line: lineno,
        content: decoded.trim().to_string(),
    };
    if parsing == Parsing::Strict && std::str::from_utf8(content).is_err() {
        return Err(invalid());
    }

    let mut values = [0.0f64; 3];
    let mut tokens = decoded.split_whitespace();
    match parsing {
        Parsing::Strict => {
            for value in &mut values {
                *value = tokens
                    .next()
                    .and_then(|token| token.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .ok_or_else(invalid)?;
            }
            if tokens.next().is_some() {
                return Err(invalid());
            }
        }
        Parsing::Lenient => {
            let mut parsed = 0;
            for (value, token) in values.iter_mut().zip(tokens) {
                match token.parse::<f64>() {
                    Ok(v) if v.is_finite() => *value = v,
                    _ => break,
                }
                parsed += 1;
            }
            if parsed < values.len() {
                log::warn!(
                    "line {lineno}: read {parsed} of 3 coordinates from '{}', defaulting the rest to zero",
                    decoded.trim()
                );
            }
        }
    }
    Ok(DVec3::from_array(values))
}
