use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use foilkit_core::normalize::{convert_to_canonical, ConvertError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// Split at the middle of the point list (default)
    Midpoint,
    /// Split at the interior point with the smallest x, falling back to the middle
    LeadingEdge,
}

impl From<SplitStrategy> for foilkit_core::normalize::SplitStrategy {
    fn from(s: SplitStrategy) -> Self {
        match s {
            SplitStrategy::Midpoint => foilkit_core::normalize::SplitStrategy::Midpoint,
            SplitStrategy::LeadingEdge => foilkit_core::normalize::SplitStrategy::LeadingEdge,
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(name = "convert")]
#[command(about = "Reorder raw coordinate files into XFOIL winding")]
pub struct App {
    /// Directory with raw coordinate files
    #[arg(long, env = "FOILKIT_SOURCE_DIR", default_value = "airfoils/origin")]
    pub source_dir: PathBuf,

    /// Directory the canonical files are written to
    #[arg(long, env = "FOILKIT_CANONICAL_DIR", default_value = "airfoils/xfoil_format")]
    pub output_dir: PathBuf,

    /// How to split the coordinates into upper and lower surfaces
    #[arg(long, env = "FOILKIT_SPLIT", default_value = "midpoint")]
    pub strategy: SplitStrategy,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome for one source file
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ConvertReport {
    pub converted: usize,
    pub skipped: usize,
    pub files: Vec<FileOutcome>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Source: {}", app.source_dir.display());
        println!("Output: {}", app.output_dir.display());
        println!();
    }

    let report = convert_directory(&app.source_dir, &app.output_dir, app.strategy.into())?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "\n{} converted, {} skipped",
            report.converted.to_string().green().bold(),
            report.skipped.to_string().yellow().bold()
        );
    }

    Ok(())
}

/// Regular files in `dir`, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();

    files.sort();

    Ok(files)
}

/// Convert one raw file into `output_dir`, keeping its file name
///
/// Nothing is written when the file is rejected. Rows that could not be read
/// are logged as warnings.
pub fn convert_file(
    input: &Path,
    output_dir: &Path,
    strategy: foilkit_core::normalize::SplitStrategy,
) -> Result<(PathBuf, usize), Error> {
    let file_name = input
        .file_name()
        .ok_or_else(|| Error::MalformedInput(format!("{} has no file name", input.display())))?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Source files are not always valid UTF-8
    let bytes = fs::read(input)?;
    let content = String::from_utf8_lossy(&bytes);

    let canonical = convert_to_canonical(&content, &stem, strategy).map_err(|e| match e {
        ConvertError::Parse(e) => Error::MalformedInput(e.to_string()),
        ConvertError::Normalize(e) => Error::MalformedInput(e.to_string()),
    })?;

    for row in &canonical.skipped {
        log::warn!(
            "{}:{}: skipping invalid row '{}' ({})",
            input.display(),
            row.line,
            row.content,
            row.reason
        );
    }

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join(file_name);
    fs::write(&output, canonical.text)?;

    Ok((output, canonical.points.len()))
}

/// Convert every file in `source_dir`
pub fn convert_directory(
    source_dir: &Path,
    output_dir: &Path,
    strategy: foilkit_core::normalize::SplitStrategy,
) -> Result<ConvertReport> {
    let mut report = ConvertReport::default();

    for input in list_files(source_dir)? {
        let file = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match convert_file(&input, output_dir, strategy) {
            Ok((output, points)) => {
                println!("{} {} -> {}", "✓".green(), file, output.display());
                report.converted += 1;
                report.files.push(FileOutcome {
                    file,
                    points: Some(points),
                    error: None,
                });
            }
            Err(err) => {
                eprintln!("{} Skipping {}: {}", "⚠".yellow(), file, err);
                report.skipped += 1;
                report.files.push(FileOutcome {
                    file,
                    points: None,
                    error: Some(err),
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use foilkit_core::coords::{parse_coordinates, Layout};
    use foilkit_core::normalize::SplitStrategy as CoreStrategy;
    use tempfile::TempDir;

    const RAW: &str = "NACA 0012\n\n0.0 0.0\n0.5 0.05\n1.0 0.001\n0.0 0.0\n0.5 -0.05\n1.0 -0.001\n";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_convert_file_writes_canonical_output() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let input = write(source.path(), "naca0012.dat", RAW);

        let (path, points) = convert_file(&input, output.path(), CoreStrategy::Midpoint).unwrap();

        assert_eq!(path, output.path().join("naca0012.dat"));
        assert_eq!(points, 6);
        let written = fs::read_to_string(&path).unwrap();
        let parsed = parse_coordinates(&written, Layout::Canonical).unwrap();
        assert_eq!(parsed.points.len(), 6);
        assert_eq!(parsed.name, Some("NACA 0012".to_string()));
        assert!(written.lines().nth(1).unwrap().starts_with("1.000000"));
    }

    #[test]
    fn test_convert_file_creates_output_directory() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let nested = output.path().join("a").join("b");
        let input = write(source.path(), "naca0012.dat", RAW);

        convert_file(&input, &nested, CoreStrategy::Midpoint).unwrap();

        assert!(nested.join("naca0012.dat").exists());
    }

    #[test]
    fn test_convert_file_rejects_three_points_without_output() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let input = write(source.path(), "tiny.dat", "Tiny\n\n0.0 0.0\n0.5 0.05\n1.0 0.0\n");

        let result = convert_file(&input, output.path(), CoreStrategy::Midpoint);

        assert!(matches!(result, Err(Error::MalformedInput(_))));
        assert!(!output.path().join("tiny.dat").exists());
    }

    #[test]
    fn test_convert_file_rejects_short_file_without_output() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let input = write(source.path(), "short.dat", "Short\n0.0 0.0\n");

        let result = convert_file(&input, output.path(), CoreStrategy::Midpoint);

        assert!(result.is_err());
        assert!(!output.path().join("short.dat").exists());
    }

    #[test]
    fn test_convert_file_tolerates_invalid_utf8() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let input = source.path().join("latin1.dat");
        let mut bytes = b"G\xf6ttingen 398\n\n".to_vec();
        bytes.extend_from_slice(b"0.0 0.0\n0.5 0.05\n1.0 0.0\n0.5 -0.05\n");
        fs::write(&input, bytes).unwrap();

        let (_, points) = convert_file(&input, output.path(), CoreStrategy::Midpoint).unwrap();
        assert_eq!(points, 4);
    }

    #[test]
    fn test_convert_directory_counts_outcomes() {
        let source = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write(source.path(), "a.dat", RAW);
        write(source.path(), "b.dat", "B\n\n0.0 0.0\n");
        write(source.path(), "c.dat", RAW);

        let report = convert_directory(source.path(), output.path(), CoreStrategy::Midpoint).unwrap();

        assert_eq!(report.converted, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.files[1].file, "b.dat");
        assert!(report.files[1].error.is_some());
        assert!(!output.path().join("b.dat").exists());
    }

    #[test]
    fn test_convert_directory_missing_source_is_an_error() {
        let output = TempDir::new().unwrap();
        let missing = output.path().join("missing");
        assert!(convert_directory(&missing, output.path(), CoreStrategy::Midpoint).is_err());
    }
}
