//! XFOIL command protocol and polar log parsing
//!
//! The solver is driven through its standard input with a short, fixed list of
//! commands. Results come back only through the polar accumulation log, so
//! everything here is pure: building the script and reading the log text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Corner refinement angle passed to `CADD` in the geometry editor
pub const LEADING_EDGE_REFINEMENT: f64 = 0.01;

/// Flow condition for a single solver run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConditions {
    /// Angle of attack in degrees
    pub alpha: f64,
    #[serde(rename = "Re")]
    pub reynolds: f64,
    #[serde(rename = "Mach")]
    pub mach: f64,
}

impl Default for SolverConditions {
    fn default() -> Self {
        Self {
            alpha: 5.0,
            reynolds: 1e6,
            mach: 0.1,
        }
    }
}

/// One step of the scripted solver session
///
/// None of the steps expects a response on stdout; the polar log is the only
/// channel results come back through.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverCommand {
    /// Load geometry from an absolute path
    Load(String),
    /// Regenerate paneling
    Pane,
    /// Enter the geometry design menu
    Gdes,
    /// Add points at corners (leading-edge refinement)
    Cadd(f64),
    /// Apply the buffer airfoil and leave the menu
    Exec,
    /// Enter the operating point menu
    Oper,
    /// Viscous mode at the given Reynolds number
    Visc(f64),
    Mach(f64),
    /// Turn accumulation on, saving to the given path with no dump file
    PaccOpen(String),
    /// Run a single angle of attack
    Alfa(f64),
    /// Turn accumulation off
    PaccClose,
    Quit,
}

impl fmt::Display for SolverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverCommand::Load(path) => write!(f, "LOAD {path}"),
            SolverCommand::Pane => write!(f, "PANE"),
            SolverCommand::Gdes => write!(f, "GDES"),
            SolverCommand::Cadd(angle) => write!(f, "CADD {angle}"),
            SolverCommand::Exec => write!(f, "EXEC"),
            SolverCommand::Oper => write!(f, "OPER"),
            SolverCommand::Visc(reynolds) => write!(f, "VISC {reynolds}"),
            SolverCommand::Mach(mach) => write!(f, "MACH {mach}"),
            // The empty line answers the dump file prompt
            SolverCommand::PaccOpen(path) => write!(f, "PACC\n{path}\n"),
            SolverCommand::Alfa(alpha) => write!(f, "ALFA {alpha}"),
            SolverCommand::PaccClose => write!(f, "PACC"),
            SolverCommand::Quit => write!(f, "QUIT"),
        }
    }
}

/// Build the command sequence for one airfoil at one operating point
///
/// # Arguments
/// * `geometry_path` - Absolute path of the canonical coordinate file
/// * `polar_path` - Path the solver writes its accumulation log to
/// * `conditions` - Angle of attack, Reynolds and Mach numbers
pub fn build_command_script(
    geometry_path: &str,
    polar_path: &str,
    conditions: &SolverConditions,
) -> Vec<SolverCommand> {
    vec![
        SolverCommand::Load(geometry_path.to_string()),
        SolverCommand::Pane,
        SolverCommand::Gdes,
        SolverCommand::Cadd(LEADING_EDGE_REFINEMENT),
        SolverCommand::Exec,
        SolverCommand::Oper,
        SolverCommand::Visc(conditions.reynolds),
        SolverCommand::Mach(conditions.mach),
        SolverCommand::PaccOpen(polar_path.to_string()),
        SolverCommand::Alfa(conditions.alpha),
        SolverCommand::PaccClose,
        SolverCommand::Quit,
    ]
}

/// Render commands as the text written to the solver's stdin
pub fn render_script(commands: &[SolverCommand]) -> String {
    let mut script = commands
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    script.push('\n');
    script
}

/// Lift, drag and lift-to-drag ratio for one operating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub cl: f64,
    pub cd: f64,
    pub ld: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolarError {
    #[error("polar log has {lines} line(s), no converged point")]
    NoConvergedPoint { lines: usize },

    #[error("cannot read {field} from polar row '{row}'")]
    MalformedRow { field: &'static str, row: String },

    #[error("drag coefficient is zero")]
    ZeroDrag,
}

fn read_field(
    fields: &[&str],
    index: usize,
    name: &'static str,
    row: &str,
) -> Result<f64, PolarError> {
    fields
        .get(index)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or_else(|| PolarError::MalformedRow {
            field: name,
            row: row.to_string(),
        })
}

/// Extract coefficients from the accumulation log
///
/// The last non-blank line is the most recent operating point; its second and
/// third columns are CL and CD.
pub fn parse_polar_log(content: &str) -> Result<Coefficients, PolarError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 2 {
        return Err(PolarError::NoConvergedPoint { lines: lines.len() });
    }

    let row = lines
        .iter()
        .rev()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .ok_or(PolarError::NoConvergedPoint { lines: lines.len() })?;

    let fields: Vec<&str> = row.split_whitespace().collect();
    let cl = read_field(&fields, 1, "CL", row)?;
    let cd = read_field(&fields, 2, "CD", row)?;

    if cd == 0.0 {
        return Err(PolarError::ZeroDrag);
    }

    Ok(Coefficients {
        cl,
        cd,
        ld: cl / cd,
    })
}
