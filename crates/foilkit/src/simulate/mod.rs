pub mod solver;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use foilkit_core::archive::{archive_file_name, build_record, to_json, ArchiveRecord};
use foilkit_core::coords::{parse_coordinates, Layout};
use foilkit_core::xfoil::SolverConditions;
use std::fs;
use std::path::{Path, PathBuf};

use solver::{run_solver, SolverConfig, SolverProcess, XfoilProcess};

#[derive(Debug, clap::Parser)]
#[command(name = "simulate")]
#[command(about = "Run XFOIL on canonical files and archive the coefficients")]
pub struct App {
    /// Directory with canonical (XFOIL-ordered) coordinate files
    #[arg(long, env = "FOILKIT_CANONICAL_DIR", default_value = "airfoils/xfoil_format")]
    pub input_dir: PathBuf,

    /// Directory archive records are written to
    #[arg(long, env = "FOILKIT_DATA_DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Angle of attack in degrees
    #[arg(long, env = "FOILKIT_ALPHA", default_value = "5.0", allow_negative_numbers = true)]
    pub alpha: f64,

    /// Reynolds number
    #[arg(long, env = "FOILKIT_REYNOLDS", default_value = "1e6")]
    pub reynolds: f64,

    /// Mach number
    #[arg(long, env = "FOILKIT_MACH", default_value = "0.1")]
    pub mach: f64,

    /// XFOIL executable name or path
    #[arg(long, env = "XFOIL_BIN", default_value = "xfoil")]
    pub xfoil: String,

    /// Directory for the solver's polar log (defaults to a temporary directory)
    #[arg(long, env = "FOILKIT_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Successful airfoil
#[derive(Debug, Clone, serde::Serialize)]
pub struct Simulated {
    pub file: String,
    pub archive: PathBuf,
    #[serde(rename = "Cl")]
    pub cl: f64,
    #[serde(rename = "Cd")]
    pub cd: f64,
    #[serde(rename = "LD")]
    pub ld: f64,
}

/// Airfoil that produced no record
#[derive(Debug, Clone, serde::Serialize)]
pub struct Failed {
    pub file: String,
    pub error: Error,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BatchReport {
    pub conditions: Option<SolverConditions>,
    pub simulated: Vec<Simulated>,
    pub failed: Vec<Failed>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let conditions = SolverConditions {
        alpha: app.alpha,
        reynolds: app.reynolds,
        mach: app.mach,
    };

    let process = XfoilProcess::locate(&app.xfoil)?;

    // The temporary directory must outlive the batch
    let (work_dir, temp_dir) = match app.work_dir.clone() {
        Some(dir) => (dir, None),
        None => {
            let temp = tempfile::TempDir::new().context("Failed to create work directory")?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("Failed to create work directory {}", work_dir.display()))?;

    if global.verbose {
        println!("XFOIL: {}", process.binary().display());
        println!("Work directory: {}", work_dir.display());
        println!(
            "Conditions: alpha = {}, Re = {}, Mach = {}",
            conditions.alpha, conditions.reynolds, conditions.mach
        );
        println!();
    }

    let config = SolverConfig {
        conditions,
        work_dir,
    };

    // The solver blocks on a child process
    let report = tokio::task::spawn_blocking(move || {
        run_batch(&process, &config, &app.input_dir, &app.output_dir)
    })
    .await??;

    drop(temp_dir);

    if app.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output_formatted(&report);
    }

    Ok(())
}

/// `.dat` files in `dir`, sorted by name
pub fn list_dat_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(crate::convert::list_files(dir)?
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "dat"))
        .collect())
}

/// Write a record as `<output_dir>/<source stem>.json`
pub fn write_record(
    output_dir: &Path,
    source_file_name: &str,
    record: &ArchiveRecord,
) -> Result<PathBuf, Error> {
    fs::create_dir_all(output_dir)?;

    let path = output_dir.join(archive_file_name(source_file_name));
    let json = to_json(record).map_err(|e| Error::Io(e.to_string()))?;
    fs::write(&path, json)?;

    Ok(path)
}

/// Solve, re-read and archive one canonical file
pub fn simulate_file(
    process: &dyn SolverProcess,
    config: &SolverConfig,
    input: &Path,
    output_dir: &Path,
) -> Result<Simulated, Error> {
    let file = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file.strip_suffix(".dat").unwrap_or(&file).to_string();

    let coefficients = run_solver(process, input, config);

    let parsed = fs::read(input)
        .map_err(Error::from)
        .and_then(|bytes| {
            parse_coordinates(&String::from_utf8_lossy(&bytes), Layout::Canonical)
                .map_err(|e| Error::MalformedInput(e.to_string()))
        });

    let (coefficients, parsed) = match (coefficients, parsed) {
        (Ok(c), Ok(p)) => (c, p),
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };

    let record = build_record(
        &stem,
        Some(parsed.points.as_slice()),
        Some(coefficients),
        config.conditions,
    )
    .map_err(|e| Error::MalformedInput(e.to_string()))?;

    let archive = write_record(output_dir, &file, &record)?;

    Ok(Simulated {
        file,
        archive,
        cl: record.cl,
        cd: record.cd,
        ld: record.ld,
    })
}

/// Simulate every `.dat` file in `input_dir`, one at a time
pub fn run_batch(
    process: &dyn SolverProcess,
    config: &SolverConfig,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    let mut report = BatchReport {
        conditions: Some(config.conditions),
        ..Default::default()
    };

    for input in list_dat_files(input_dir)? {
        match simulate_file(process, config, &input, output_dir) {
            Ok(simulated) => {
                println!(
                    "{} Saved {}, Cl = {:.4}, Cd = {:.4}, L/D = {:.2}",
                    "✓".green(),
                    simulated.archive.display(),
                    simulated.cl,
                    simulated.cd,
                    simulated.ld
                );
                report.simulated.push(simulated);
            }
            Err(error) => {
                let file = input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                eprintln!("{} Simulation failed for {}: {}", "✗".red(), file, error);
                log::warn!("{}: {}", input.display(), error);
                report.failed.push(Failed { file, error });
            }
        }
    }

    Ok(report)
}

fn output_formatted(report: &BatchReport) {
    if !report.simulated.is_empty() {
        let mut table = new_table();
        table.add_row(prettytable::row!["Airfoil", "Cl", "Cd", "L/D"]);

        for item in &report.simulated {
            table.add_row(prettytable::row![
                item.file,
                format!("{:.4}", item.cl),
                format!("{:.5}", item.cd),
                format!("{:.2}", item.ld)
            ]);
        }

        println!();
        table.printstd();
    }

    println!(
        "\n{} simulated, {} failed",
        report.simulated.len().to_string().green().bold(),
        report.failed.len().to_string().red().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::solver::tests::FakeSolver;
    use super::*;
    use tempfile::TempDir;

    const CANONICAL: &str = "NACA 0012\n1.000000 0.001260\n0.500000 0.050000\n0.000000 0.000000\n0.500000 -0.050000\n1.000000 -0.001260\n";

    fn setup() -> (TempDir, TempDir, TempDir, SolverConfig) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let config = SolverConfig {
            conditions: SolverConditions::default(),
            work_dir: work.path().to_path_buf(),
        };
        (input, output, work, config)
    }

    #[test]
    fn test_simulate_file_writes_archive_record() {
        let (input, output, _work, config) = setup();
        let path = input.path().join("naca0012.dat");
        fs::write(&path, CANONICAL).unwrap();

        let solver = FakeSolver::writing("alpha CL CD\n5.0 0.823 0.0142\n");
        let simulated = simulate_file(&solver, &config, &path, output.path()).unwrap();

        assert_eq!(simulated.archive, output.path().join("naca0012.json"));
        let json = fs::read_to_string(&simulated.archive).unwrap();
        let record: ArchiveRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.name, "naca0012");
        assert_eq!(record.x.len(), 5);
        assert_eq!(record.y[1], 0.05);
        assert!((record.ld - 57.9577).abs() < 1e-4);
    }

    #[test]
    fn test_simulate_file_without_result_writes_nothing() {
        let (input, output, _work, config) = setup();
        let path = input.path().join("naca0012.dat");
        fs::write(&path, CANONICAL).unwrap();

        let solver = FakeSolver::writing("alpha CL CD\n");
        let result = simulate_file(&solver, &config, &path, output.path());

        assert!(result.is_err());
        assert!(!output.path().join("naca0012.json").exists());
    }

    #[test]
    fn test_simulate_file_with_bad_geometry_writes_nothing() {
        let (input, output, _work, config) = setup();
        let path = input.path().join("broken.dat");
        fs::write(&path, "Broken\n1.0 0.0\n").unwrap();

        let solver = FakeSolver::writing("alpha CL CD\n5.0 0.5 0.01\n");
        let result = simulate_file(&solver, &config, &path, output.path());

        assert!(matches!(result, Err(Error::MalformedInput(_))));
        assert!(!output.path().join("broken.json").exists());
    }

    #[test]
    fn test_run_batch_continues_after_failures() {
        let (input, output, _work, config) = setup();
        fs::write(input.path().join("a.dat"), CANONICAL).unwrap();
        fs::write(input.path().join("b.dat"), "B\n0.0 0.0\n").unwrap();
        fs::write(input.path().join("c.dat"), CANONICAL).unwrap();
        fs::write(input.path().join("notes.txt"), "not an airfoil").unwrap();

        let solver = FakeSolver::writing("alpha CL CD\n5.0 0.5 0.01\n");
        let report = run_batch(&solver, &config, input.path(), output.path()).unwrap();

        assert_eq!(report.simulated.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file, "b.dat");
        assert!(output.path().join("a.json").exists());
        assert!(output.path().join("c.json").exists());
        assert!(!output.path().join("notes.json").exists());
    }

    #[test]
    fn test_write_record_creates_directory() {
        let output = TempDir::new().unwrap();
        let nested = output.path().join("data");
        let record = ArchiveRecord {
            name: "e387".to_string(),
            x: vec![1.0, 0.0, 1.0],
            y: vec![0.0, 0.0, 0.0],
            cl: 0.4,
            cd: 0.01,
            ld: 40.0,
            conditions: SolverConditions::default(),
        };

        let path = write_record(&nested, "e387.dat", &record).unwrap();

        assert_eq!(path, nested.join("e387.json"));
        assert!(path.exists());
    }
}
