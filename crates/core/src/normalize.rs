//! Surface normalization into the solver winding order
//!
//! Raw coordinate files usually store the upper surface leading edge to
//! trailing edge, followed by the lower surface in the same direction. XFOIL
//! expects a single loop: trailing edge → leading edge along the upper
//! surface, then leading edge → trailing edge along the lower surface.
//!
//! The default [`SplitStrategy::Midpoint`] does not look at the geometry: it
//! splits at `len / 2` and reverses the first half. Non-standard orderings
//! therefore produce a syntactically valid but geometrically wrong loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::{parse_coordinates, Layout, ParseError, Point, SkippedRow, MIN_POINTS};

/// Tolerance used when matching the leading edge x coordinate
const LEADING_EDGE_TOLERANCE: f64 = 1e-9;

/// Where to split the raw sequence into upper and lower surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// Split at `len / 2`
    #[default]
    Midpoint,
    /// Split at the interior point with minimum x, falling back to the midpoint
    LeadingEdge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("not enough coordinate points ({found}, need at least {MIN_POINTS})")]
    InsufficientPoints { found: usize },
}

/// Error returned by [`convert_to_canonical`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A normalized airfoil ready to be written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalAirfoil {
    pub name: String,
    pub points: Vec<Point>,
    /// Rows dropped while parsing the source
    pub skipped: Vec<SkippedRow>,
    /// Rendered file content
    pub text: String,
}

/// Index of the leading edge: the first interior point with minimum x
///
/// Only interior indices are considered so that a sequence starting at the
/// leading edge (`0.0, ..., 1.0, 0.0, ..., 1.0`) splits at its second
/// occurrence. Returns `None` when the minimum is only reached at the ends.
pub fn leading_edge_index(points: &[Point]) -> Option<usize> {
    if points.len() < 3 {
        return None;
    }

    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() {
        return None;
    }

    (1..points.len() - 1).find(|&i| points[i].x <= min_x + LEADING_EDGE_TOLERANCE)
}

/// Index at which the sequence is split for the given strategy
pub fn split_index(points: &[Point], strategy: SplitStrategy) -> usize {
    let midpoint = points.len() / 2;

    match strategy {
        SplitStrategy::Midpoint => midpoint,
        SplitStrategy::LeadingEdge => leading_edge_index(points).unwrap_or(midpoint),
    }
}

/// Reorder raw coordinates into trailing → leading → trailing winding
///
/// The first half is reversed and followed by the second half unchanged.
/// The point count is preserved.
pub fn normalize(points: &[Point], strategy: SplitStrategy) -> Result<Vec<Point>, NormalizeError> {
    if points.len() < MIN_POINTS {
        return Err(NormalizeError::InsufficientPoints {
            found: points.len(),
        });
    }

    let (upper, lower) = points.split_at(split_index(points, strategy));

    Ok(upper.iter().rev().chain(lower.iter()).copied().collect())
}

/// Render a canonical coordinate file: name line, then `x y` with 6 decimals
pub fn format_canonical(name: &str, points: &[Point]) -> String {
    let mut result = String::with_capacity(name.len() + 1 + points.len() * 20);

    result.push_str(name);
    result.push('\n');
    for point in points {
        result.push_str(&format!("{:.6} {:.6}\n", point.x, point.y));
    }

    result
}

/// Parse a raw coordinate file and produce its canonical form
///
/// # Arguments
/// * `content` - Raw file text
/// * `fallback_name` - Name used when the file has no title line
/// * `strategy` - How to split the surfaces
pub fn convert_to_canonical(
    content: &str,
    fallback_name: &str,
    strategy: SplitStrategy,
) -> Result<CanonicalAirfoil, ConvertError> {
    let parsed = parse_coordinates(content, Layout::Raw)?;
    let name = parsed.name_or(fallback_name);
    let points = normalize(&parsed.points, strategy)?;
    let text = format_canonical(&name, &points);

    Ok(CanonicalAirfoil {
        name,
        points,
        skipped: parsed.skipped,
        text,
    })
}
