//! Airfoil coordinate file parsing
//!
//! Pure functions that turn the text of a coordinate file into an ordered list
//! of points. Two layouts are understood:
//!
//! - [`Layout::Raw`]: UIUC-style source files. Line 1 is the airfoil name and
//!   line 2 is a point count or blank separator, which is always ignored.
//! - [`Layout::Canonical`]: files written by
//!   [`format_canonical`](crate::normalize::format_canonical). The name is
//!   followed directly by the data block.
//!
//! Rows that cannot be read are reported back in [`ParsedAirfoil::skipped`]
//! instead of failing the whole file, so callers decide how to surface them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of lines a coordinate file must have (title, header, data)
pub const MIN_LINES: usize = 3;

/// Minimum number of valid coordinate rows required to describe an airfoil
pub const MIN_POINTS: usize = 4;

/// A single chord-normalized coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the lines following the title are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Title, ignored header line, then data
    #[default]
    Raw,
    /// Title, then data starting at the first numeric row
    Canonical,
}

/// A row that looked like data but could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 1-based line number in the source text
    pub line: usize,
    pub content: String,
    pub reason: String,
}

/// Result of parsing a coordinate file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAirfoil {
    /// Trimmed first line, `None` when it is blank or a headerless canonical
    /// file starts straight with data
    pub name: Option<String>,
    /// Coordinates in file order
    pub points: Vec<Point>,
    pub skipped: Vec<SkippedRow>,
}

impl ParsedAirfoil {
    /// Airfoil name, falling back to `fallback` (usually the file stem)
    pub fn name_or(&self, fallback: &str) -> String {
        self.name.clone().unwrap_or_else(|| fallback.to_string())
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

/// Reasons a coordinate file is rejected
///
/// Both variants mean "insufficient data": callers skip the file and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("not enough lines ({found}, need at least {MIN_LINES})")]
    TooFewLines { found: usize },

    #[error("not enough coordinate points ({found}, need at least {MIN_POINTS})")]
    InsufficientPoints { found: usize },
}

/// Whether the first whitespace-delimited token of `line` is a float
pub fn is_numeric_row(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<f64>().is_ok())
}

/// Parse a single data row into a point
///
/// Accepts 2 or 3 columns; the third column (a dummy z or index) is dropped.
pub fn parse_row(line: &str) -> Result<Point, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if !(2..=3).contains(&tokens.len()) {
        return Err(format!("expected 2 or 3 columns, found {}", tokens.len()));
    }

    let x = tokens[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid x value '{}'", tokens[0]))?;
    let y = tokens[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid y value '{}'", tokens[1]))?;

    Ok(Point::new(x, y))
}

/// Parse the content of a coordinate file
///
/// # Arguments
/// * `content` - Full text of the file
/// * `layout` - Whether the file is a raw source file or a canonical one
///
/// # Returns
/// The name, points in original order and any skipped rows, or a
/// [`ParseError`] when the file does not carry enough data.
pub fn parse_coordinates(content: &str, layout: Layout) -> Result<ParsedAirfoil, ParseError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < MIN_LINES {
        return Err(ParseError::TooFewLines { found: lines.len() });
    }

    let title = lines[0].trim();
    let (name, data_start) = match layout {
        // Line 1 is always the title, even when it starts with a number
        Layout::Raw => (Some(title.to_string()), 2),
        // Headerless canonical file: the first line is already a point
        Layout::Canonical if parse_row(title).is_ok() => (None, 0),
        Layout::Canonical => (
            Some(title.to_string()),
            lines
                .iter()
                .skip(1)
                .position(|line| is_numeric_row(line))
                .map_or(lines.len(), |offset| offset + 1),
        ),
    };
    let name = name.filter(|n| !n.is_empty());

    let mut points = Vec::new();
    let mut skipped = Vec::new();

    for (index, line) in lines.iter().enumerate().skip(data_start) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_row(trimmed) {
            Ok(point) => points.push(point),
            Err(reason) => skipped.push(SkippedRow {
                line: index + 1,
                content: trimmed.to_string(),
                reason,
            }),
        }
    }

    if points.len() < MIN_POINTS {
        return Err(ParseError::InsufficientPoints {
            found: points.len(),
        });
    }

    Ok(ParsedAirfoil {
        name,
        points,
        skipped,
    })
}
