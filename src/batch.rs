//! Directory batches: enumerate mesh files, analyze each one and write the
//! result tables.
//!
//! A file that fails to load is reported and skipped; it never stops the
//! batch. Results are written in sorted file-name order whether or not the
//! analysis itself ran in parallel.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;
use wildmatch::WildMatch;

use crate::geom::{ReliefClass, ReliefOptions, ReliefReport, relief_report};
use crate::parse::ParseError;
use crate::parse::off::load_off;
use crate::report::{BatchWriter, RESULTS_DIR_NAME, ReportError, SummaryRow, format_value, tooth_id};
use crate::{AnalysisConfig, ToothAnalysis, analyze_file};

/// Pattern used when the caller does not pass one.
pub const DEFAULT_PATTERN: &str = "*.off";
pub const TALL_ENOUGH_FILE: &str = "tall_enough.txt";
pub const TOO_FLAT_FILE: &str = "too_flat.txt";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Report(#[from] ReportError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BatchError + '_ {
    move |source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Files directly inside `dir` whose names match `pattern`, sorted by path.
pub fn collect_mesh_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, BatchError> {
    let matcher = WildMatch::new(pattern);
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| matcher.matches(name));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    log::debug!("{} files matching `{pattern}` in {}", files.len(), dir.display());
    Ok(files)
}

/// Tooth identifier for a mesh path.
#[must_use]
pub fn tooth_id_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    tooth_id(&stem).to_owned()
}

/// Analysis result of one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ToothAnalysis, ParseError>,
}

fn analyze_one(path: PathBuf, config: &AnalysisConfig) -> FileOutcome {
    log::debug!("analyzing {}", path.display());
    let result = analyze_file(&path, config);
    FileOutcome { path, result }
}

/// Analyzes every file; the output keeps the input order.
#[cfg(feature = "parallel")]
#[must_use]
pub fn analyze_files(paths: Vec<PathBuf>, config: &AnalysisConfig) -> Vec<FileOutcome> {
    paths
        .into_par_iter()
        .map(|path| analyze_one(path, config))
        .collect()
}

/// Analyzes every file; the output keeps the input order.
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn analyze_files(paths: Vec<PathBuf>, config: &AnalysisConfig) -> Vec<FileOutcome> {
    paths
        .into_iter()
        .map(|path| analyze_one(path, config))
        .collect()
}

/// A file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug)]
pub struct CuspBatchSummary {
    pub results_dir: PathBuf,
    pub rows: Vec<SummaryRow>,
    pub failures: Vec<FileFailure>,
}

/// Runs the cusp analysis over `dir` and writes the result tables.
///
/// Tables go to `out_dir`, or to `<dir>/z_batch_results` when it is `None`.
pub fn run_cusp_batch(
    dir: &Path,
    pattern: &str,
    config: &AnalysisConfig,
    out_dir: Option<&Path>,
) -> Result<CuspBatchSummary, BatchError> {
    let files = collect_mesh_files(dir, pattern)?;
    let results_dir = out_dir.map_or_else(|| dir.join(RESULTS_DIR_NAME), Path::to_path_buf);
    let mut writer = BatchWriter::create(&results_dir)?;

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for outcome in analyze_files(files, config) {
        match outcome.result {
            Ok(analysis) => {
                let row = SummaryRow::from_report(tooth_id_for(&outcome.path), &analysis.report);
                writer.write_row(&row)?;
                rows.push(row);
            }
            Err(err) => {
                log::warn!("skipping {}: {err}", outcome.path.display());
                failures.push(FileFailure {
                    path: outcome.path,
                    message: err.to_string(),
                });
            }
        }
    }

    let results_dir = writer.finish()?;
    log::info!(
        "cusp batch: {} analyzed, {} failed, results in {}",
        rows.len(),
        failures.len(),
        results_dir.display()
    );
    Ok(CuspBatchSummary {
        results_dir,
        rows,
        failures,
    })
}

#[derive(Debug, Default)]
pub struct ReliefBatchSummary {
    pub tall_enough: Vec<(PathBuf, f64)>,
    pub too_flat: Vec<(PathBuf, f64)>,
    pub failures: Vec<FileFailure>,
}

fn relief_of(path: &Path, options: &ReliefOptions) -> Result<Option<ReliefReport>, ParseError> {
    let mesh = load_off(path)?;
    Ok(relief_report(&mesh, options))
}

/// Classifies every mesh in `dir` by relief and writes `tall_enough.txt` and
/// `too_flat.txt` (lines `<file name> <relief>`) into `out_dir`.
///
/// Meshes without vertices have no relief and are reported as failures.
pub fn run_relief_batch(
    dir: &Path,
    pattern: &str,
    options: &ReliefOptions,
    out_dir: &Path,
) -> Result<ReliefBatchSummary, BatchError> {
    let files = collect_mesh_files(dir, pattern)?;
    let mut summary = ReliefBatchSummary::default();

    for path in files {
        match relief_of(&path, options) {
            Ok(Some(report)) => {
                log::debug!("{}: relief {} ({:?})", path.display(), report.relief, report.class);
                match report.class {
                    ReliefClass::TallEnough => summary.tall_enough.push((path, report.relief)),
                    ReliefClass::TooFlat => summary.too_flat.push((path, report.relief)),
                }
            }
            Ok(None) => {
                log::warn!("skipping {}: mesh has no vertices", path.display());
                summary.failures.push(FileFailure {
                    path,
                    message: "mesh has no vertices".to_owned(),
                });
            }
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                summary.failures.push(FileFailure {
                    path,
                    message: err.to_string(),
                });
            }
        }
    }

    fs::create_dir_all(out_dir).map_err(io_error(out_dir))?;
    write_relief_list(&out_dir.join(TALL_ENOUGH_FILE), &summary.tall_enough)?;
    write_relief_list(&out_dir.join(TOO_FLAT_FILE), &summary.too_flat)?;
    Ok(summary)
}

fn write_relief_list(path: &Path, entries: &[(PathBuf, f64)]) -> Result<(), BatchError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    for (mesh, relief) in entries {
        let name = mesh
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        writeln!(writer, "{name} {}", format_value(*relief)).map_err(io_error(path))?;
    }
    writer.flush().map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crown_engine_batch_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn collects_matching_files_sorted() {
        let dir = scratch_dir("collect");
        for name in ["b.off", "a.off", "notes.txt", "c.OFF"] {
            fs::write(dir.join(name), "OFF\n0 0 0\n").unwrap();
        }
        fs::create_dir_all(dir.join("nested.off")).unwrap();

        let files = collect_mesh_files(&dir, DEFAULT_PATTERN).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.off", "b.off"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn tooth_id_uses_file_stem() {
        assert_eq!(tooth_id_for(Path::new("/data/run9_Act_0.5.off")), "Act_0.5");
        assert_eq!(tooth_id_for(Path::new("plain.off")), "plain");
    }

    #[test]
    fn relief_batch_splits_tall_and_flat() {
        let dir = scratch_dir("relief");
        fs::write(dir.join("tall.off"), "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 2\n3 0 1 2\n").unwrap();
        fs::write(dir.join("flat.off"), "OFF\n3 1 0\n0 0 0\n1 0 0.1\n0 1 0\n3 0 1 2\n").unwrap();
        fs::write(dir.join("broken.off"), "PLY\n").unwrap();

        let summary = run_relief_batch(&dir, DEFAULT_PATTERN, &ReliefOptions::default(), &dir).unwrap();
        assert_eq!(summary.tall_enough.len(), 1);
        assert_eq!(summary.too_flat.len(), 1);
        assert_eq!(summary.failures.len(), 1);

        let tall = fs::read_to_string(dir.join(TALL_ENOUGH_FILE)).unwrap();
        assert_eq!(tall, "tall.off 2.0\n");
        let flat = fs::read_to_string(dir.join(TOO_FLAT_FILE)).unwrap();
        assert_eq!(flat, "flat.off 0.1\n");

        let _ = fs::remove_dir_all(&dir);
    }
}
