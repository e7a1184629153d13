//! Tab-separated cusp summaries and the batch result files built from them.
//!
//! One summary row per tooth:
//!
//! ```text
//! ID  RADIANS  DEGREES  NOTES  REAL CUSPS  FAILS INHIB?
//! ```
//!
//! Undefined angles leave the radian and degree fields empty, and a failed
//! inhibitory-cascade check is marked with `FAILS`.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::cusp::CuspReport;

pub const SUMMARY_HEADER: &str = "ID\tRADIANS\tDEGREES\tNOTES\tREAL CUSPS\tFAILS INHIB?";
pub const COMBINED_HEADER: &str =
    "Tooth Name\tRADIANS\tDEGREES\tNOTES\tREAL CUSPS\tFAILS INHIB?\tOPC Value";
pub const FAIL_MARKER: &str = "FAILS";

/// Directory created next to the analyzed meshes.
pub const RESULTS_DIR_NAME: &str = "z_batch_results";
pub const FULL_BATCH_FILE: &str = "z_full_batch_out.txt";
pub const ANGLES_FILE: &str = "angles.txt";
pub const FAILS_FILE: &str = "fails.txt";

/// OPC result files name teeth as `..._9000_<digits>...`.
const OPC_TOOTH_PATTERN: &str = r"9000_(\d+)";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("OPC table line {line}: expected `filename,value`")]
    MalformedOpcRow { line: usize },
    #[error("invalid tooth pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One summary row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub id: String,
    pub radians: Option<f64>,
    pub degrees: Option<f64>,
    pub notes: String,
    pub real_cusps: usize,
    pub fails_cascade: bool,
}

impl SummaryRow {
    #[must_use]
    pub fn from_report(id: impl Into<String>, report: &CuspReport) -> Self {
        let angle = report.angle();
        Self {
            id: id.into(),
            radians: angle.map(|a| a.radians),
            degrees: angle.map(|a| a.degrees),
            notes: String::new(),
            real_cusps: report.real_cusp_count,
            fails_cascade: !report.cascade.passes(),
        }
    }

    #[must_use]
    pub fn has_angle(&self) -> bool {
        self.radians.is_some()
    }

    /// The row as tab-separated text, without a trailing newline.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.id,
            self.radians.map(format_value).unwrap_or_default(),
            self.degrees.map(format_value).unwrap_or_default(),
            self.notes,
            self.real_cusps,
            if self.fails_cascade { FAIL_MARKER } else { "" }
        )
    }
}

/// Formats a number the way the downstream spreadsheets expect: shortest
/// round-trip form, always with a decimal point (`90.0`, `1.571`).
#[must_use]
pub fn format_value(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e']) {
        format!("{text}.0")
    } else {
        text
    }
}

/// Tooth identifier from a mesh file stem: the text after the first `9_`,
/// or the whole stem when the marker is absent.
#[must_use]
pub fn tooth_id(stem: &str) -> &str {
    stem.split_once("9_").map_or(stem, |(_, rest)| rest)
}

/// Writes the batch result files into one directory.
///
/// - `z_full_batch_out.txt`: every row
/// - `angles.txt`: rows with a defined angle
/// - `fails.txt`: rows failing the inhibitory cascade
/// - `<N>_cusp.txt`: rows grouped by real-cusp count, created on demand
pub struct BatchWriter {
    dir: PathBuf,
    full: BufWriter<File>,
    angles: BufWriter<File>,
    fails: BufWriter<File>,
    by_cusp_count: BTreeMap<usize, BufWriter<File>>,
}

impl BatchWriter {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        let full = create_table(&dir.join(FULL_BATCH_FILE))?;
        let angles = create_table(&dir.join(ANGLES_FILE))?;
        let fails = create_table(&dir.join(FAILS_FILE))?;
        Ok(Self {
            dir,
            full,
            angles,
            fails,
            by_cusp_count: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_row(&mut self, row: &SummaryRow) -> Result<(), ReportError> {
        let line = row.to_tsv();
        let dir = self.dir.clone();

        writeln!(self.full, "{line}").map_err(io_error(&dir))?;
        if row.has_angle() {
            writeln!(self.angles, "{line}").map_err(io_error(&dir))?;
        }
        if row.fails_cascade {
            writeln!(self.fails, "{line}").map_err(io_error(&dir))?;
        }

        let writer = match self.by_cusp_count.entry(row.real_cusps) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                let path = dir.join(format!("{}_cusp.txt", row.real_cusps));
                entry.insert(create_table(&path)?)
            }
        };
        writeln!(writer, "{line}").map_err(io_error(&dir))
    }

    /// Flushes every open file.
    pub fn finish(mut self) -> Result<PathBuf, ReportError> {
        let dir = self.dir.clone();
        self.full.flush().map_err(io_error(&dir))?;
        self.angles.flush().map_err(io_error(&dir))?;
        self.fails.flush().map_err(io_error(&dir))?;
        for writer in self.by_cusp_count.values_mut() {
            writer.flush().map_err(io_error(&dir))?;
        }
        Ok(dir)
    }
}

fn create_table(path: &Path) -> Result<BufWriter<File>, ReportError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{SUMMARY_HEADER}").map_err(io_error(path))?;
    Ok(writer)
}

/// Tooth name encoded in an OPC result file name.
#[must_use]
pub fn opc_tooth_name(pattern: &Regex, filename: &str) -> Option<String> {
    pattern
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Joins an OPC table (`Filename,OPC Value` CSV) with a cusp summary table.
///
/// Rows are emitted in cusp-table order for teeth present in both inputs.
/// Missing trailing summary fields are written as empty.
pub fn combine_opc(opc_csv: &str, cusp_tsv: &str) -> Result<String, ReportError> {
    let pattern = Regex::new(OPC_TOOTH_PATTERN)?;

    let mut opc_values: BTreeMap<String, String> = BTreeMap::new();
    for (idx, line) in opc_csv.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let (filename, value) = line
            .trim()
            .split_once(',')
            .ok_or(ReportError::MalformedOpcRow { line: idx + 1 })?;
        if let Some(name) = opc_tooth_name(&pattern, filename) {
            opc_values.insert(name, value.to_owned());
        }
    }

    let mut lines = vec![COMBINED_HEADER.to_owned()];
    for line in cusp_tsv.lines().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        let Some(opc) = opc_values.get(parts[0]) else {
            continue;
        };
        let field = |i: usize| parts.get(i).copied().unwrap_or_default();
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            parts[0],
            field(1),
            field(2),
            field(3),
            field(4),
            field(5),
            opc
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}
