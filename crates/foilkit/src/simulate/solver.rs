use crate::prelude::*;
use foilkit_core::xfoil::{
    build_command_script, parse_polar_log, render_script, Coefficients, SolverConditions,
};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// File name of the polar accumulation log inside the work directory
pub const POLAR_FILE_NAME: &str = "polar.txt";

/// Captured result of one solver process
#[derive(Debug, Clone, Default)]
pub struct SolverOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that can execute a solver command script
///
/// The real implementation spawns XFOIL; tests substitute a process that
/// writes a fixed polar log.
pub trait SolverProcess {
    fn run(&self, script: &str) -> std::io::Result<SolverOutput>;
}

/// XFOIL binary driven through stdin
#[derive(Debug, Clone)]
pub struct XfoilProcess {
    binary: PathBuf,
}

impl XfoilProcess {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Locate `name` on `PATH` (or accept an explicit path)
    pub fn locate(name: &str) -> Result<Self> {
        let binary = which::which(name)
            .map_err(|e| eyre!("XFOIL binary '{}' not found: {}", name, e))?;
        Ok(Self::new(binary))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl SolverProcess for XfoilProcess {
    fn run(&self, script: &str) -> std::io::Result<SolverOutput> {
        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // XFOIL may quit before reading the whole script
            match stdin.write_all(script.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;

        Ok(SolverOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Solver settings for a batch
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub conditions: SolverConditions,
    /// Directory holding the polar accumulation log
    pub work_dir: PathBuf,
}

impl SolverConfig {
    pub fn polar_path(&self) -> PathBuf {
        self.work_dir.join(POLAR_FILE_NAME)
    }
}

/// Run the solver on one canonical coordinate file
///
/// The polar log is removed first: XFOIL appends to an existing file, so a
/// leftover log would be read as this airfoil's result.
pub fn run_solver(
    process: &dyn SolverProcess,
    geometry: &Path,
    config: &SolverConfig,
) -> Result<Coefficients, Error> {
    let geometry = std::path::absolute(geometry)?;
    let polar_path = config.polar_path();

    if polar_path.exists() {
        fs::remove_file(&polar_path)?;
    }

    let commands = build_command_script(
        &geometry.to_string_lossy(),
        &polar_path.to_string_lossy(),
        &config.conditions,
    );
    let script = render_script(&commands);
    log::debug!("Solver script for {}:\n{}", geometry.display(), script);

    let output = process
        .run(&script)
        .map_err(|e| Error::Solver(format!("failed to start solver: {e}")))?;
    log::debug!("Solver stdout:\n{}", output.stdout);

    if !output.success {
        let code = output
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        return Err(Error::Solver(format!(
            "exited with status {}: {}",
            code,
            output.stderr.trim()
        )));
    }

    let log = fs::read_to_string(&polar_path).map_err(|e| {
        Error::Solver(format!("cannot read {}: {e}", polar_path.display()))
    })?;

    parse_polar_log(&log).map_err(|e| Error::Solver(e.to_string()))
}
