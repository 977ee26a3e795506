//! Per-airfoil archive records
//!
//! An archive record bundles the canonical geometry of one airfoil with the
//! coefficients the solver produced for it. Records are only built when both
//! halves are present.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coords::Point;
use crate::xfoil::{Coefficients, SolverConditions};

/// Extension used for archive files
pub const ARCHIVE_EXTENSION: &str = "json";

/// One archived airfoil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(rename = "Cl")]
    pub cl: f64,
    #[serde(rename = "Cd")]
    pub cd: f64,
    #[serde(rename = "LD")]
    pub ld: f64,
    pub conditions: SolverConditions,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("no coordinates available")]
    MissingCoordinates,

    #[error("no solver result available")]
    MissingCoefficients,
}

/// Combine geometry and solver output into a record
///
/// Fails when either the coordinates or the coefficients are missing; an empty
/// coordinate list counts as missing.
pub fn build_record(
    name: &str,
    points: Option<&[Point]>,
    coefficients: Option<Coefficients>,
    conditions: SolverConditions,
) -> Result<ArchiveRecord, ArchiveError> {
    let points = points
        .filter(|p| !p.is_empty())
        .ok_or(ArchiveError::MissingCoordinates)?;
    let coefficients = coefficients.ok_or(ArchiveError::MissingCoefficients)?;

    Ok(ArchiveRecord {
        name: name.to_string(),
        x: points.iter().map(|p| p.x).collect(),
        y: points.iter().map(|p| p.y).collect(),
        cl: coefficients.cl,
        cd: coefficients.cd,
        ld: coefficients.ld,
        conditions,
    })
}

/// Archive file name for a source coordinate file
///
/// Swaps a trailing `.dat` for `.json`; other names get `.json` appended.
pub fn archive_file_name(source_file_name: &str) -> String {
    let stem = source_file_name
        .strip_suffix(".dat")
        .unwrap_or(source_file_name);
    format!("{stem}.{ARCHIVE_EXTENSION}")
}

/// Serialize a record as pretty-printed JSON
pub fn to_json(record: &ArchiveRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(1.0, 0.001),
            Point::new(0.0, 0.0),
            Point::new(1.0, -0.001),
        ]
    }

    fn sample_coefficients() -> Coefficients {
        Coefficients {
            cl: 0.5,
            cd: 0.01,
            ld: 50.0,
        }
    }

    #[test]
    fn test_build_record() {
        let points = sample_points();
        let record = build_record(
            "naca0012",
            Some(points.as_slice()),
            Some(sample_coefficients()),
            SolverConditions::default(),
        )
        .unwrap();

        assert_eq!(record.name, "naca0012");
        assert_eq!(record.x, vec![1.0, 0.0, 1.0]);
        assert_eq!(record.y, vec![0.001, 0.0, -0.001]);
        assert_eq!(record.cl, 0.5);
        assert_eq!(record.ld, 50.0);
    }

    #[test]
    fn test_build_record_missing_coefficients() {
        let points = sample_points();
        let result = build_record("a", Some(points.as_slice()), None, SolverConditions::default());
        assert_eq!(result, Err(ArchiveError::MissingCoefficients));
    }

    #[test]
    fn test_build_record_missing_coordinates() {
        let result = build_record(
            "a",
            None,
            Some(sample_coefficients()),
            SolverConditions::default(),
        );
        assert_eq!(result, Err(ArchiveError::MissingCoordinates));

        let empty: Vec<Point> = Vec::new();
        let result = build_record(
            "a",
            Some(empty.as_slice()),
            Some(sample_coefficients()),
            SolverConditions::default(),
        );
        assert_eq!(result, Err(ArchiveError::MissingCoordinates));
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(archive_file_name("naca0012.dat"), "naca0012.json");
        assert_eq!(archive_file_name("e387.dat.dat"), "e387.dat.json");
        assert_eq!(archive_file_name("clarky"), "clarky.json");
    }

    #[test]
    fn test_to_json_field_names() {
        let points = sample_points();
        let record = build_record(
            "naca0012",
            Some(points.as_slice()),
            Some(sample_coefficients()),
            SolverConditions::default(),
        )
        .unwrap();

        let json = to_json(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Cl"], 0.5);
        assert_eq!(value["Cd"], 0.01);
        assert_eq!(value["LD"], 50.0);
        assert_eq!(value["x"][1], 0.0);
        assert_eq!(value["conditions"]["alpha"], 5.0);
        assert_eq!(value["conditions"]["Re"], 1e6);
        assert_eq!(value["conditions"]["Mach"], 0.1);
    }
}
