use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crown_engine::{AnalysisConfig, normals_for_file};
use crown_engine::batch::{self, DEFAULT_PATTERN};
use crown_engine::cusp::analyze_cusps;
use crown_engine::geom::ReliefOptions;
use crown_engine::parse::maxima::load_local_maxima;
use crown_engine::report::{SummaryRow, combine_opc, format_value};

const COMBINED_FILE: &str = "cusp_opc.txt";

const USAGE: &str = r#"crown_cli (crown-engine)

USAGE:
  crown_cli cusps <dir> [options]
  crown_cli angle <maxima file> [--cluster <x>] [--cascade <z>]
  crown_cli height <dir> [--pattern <glob>] [--threshold <z>] [--out-dir <dir>]
  crown_cli normals <mesh.off> [--out <path>] [--overwrite]
  crown_cli combine <opc.csv> <cusp table> [--out <path>] [--overwrite]

OPTIONS (cusps):
  --pattern <glob>     Mesh files to analyze (default: *.off)
  --saliency <z>       Minimum height contrast of a cusp (default: 0.5)
  --tie <z>            Neighbour height tie tolerance (default: 0.0001)
  --cluster <x>        Maximum x gap inside one real cusp (default: 0.1)
  --cascade <z>        Inhibitory cascade tolerance (default: 0.1)
  --out-dir <dir>      Result directory (default: <dir>/z_batch_results)

GLOBAL:
  -v, --verbose        Log debug output to stderr
  -h, --help           Show this help
"#;

fn main() {
    if let Err(err) = run() {
        eprintln!("crown_cli error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let (args, verbose): (Vec<String>, Vec<String>) = std::env::args()
        .skip(1)
        .partition(|arg| arg != "-v" && arg != "--verbose");
    init_logger(!verbose.is_empty());
    let mut args = Args::new(args);

    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "cusps" => cmd_cusps(&mut args),
        "angle" => cmd_angle(&mut args),
        "height" => cmd_height(&mut args),
        "normals" => cmd_normals(&mut args),
        "combine" => cmd_combine(&mut args),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
    }
}

fn print_usage() {
    println!("{USAGE}");
}

fn cmd_cusps(args: &mut Args) -> Result<(), String> {
    let dir = PathBuf::from(args.next().ok_or("missing mesh directory")?);
    let mut pattern = DEFAULT_PATTERN.to_string();
    let mut out_dir: Option<PathBuf> = None;
    let mut config = AnalysisConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pattern" => pattern = args.value("--pattern")?,
            "--saliency" => config.cusp.saliency_threshold = args.float("--saliency")?,
            "--tie" => config.cusp.tie_tolerance = args.float("--tie")?,
            "--cluster" => config.analysis.cluster_threshold = args.float("--cluster")?,
            "--cascade" => config.analysis.cascade_tolerance = args.float("--cascade")?,
            "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let summary = batch::run_cusp_batch(&dir, &pattern, &config, out_dir.as_deref())
        .map_err(|e| e.to_string())?;

    for row in &summary.rows {
        println!("{}", row.to_tsv());
    }
    for failure in &summary.failures {
        eprintln!("error processing {}: {}", failure.path.display(), failure.message);
    }
    eprintln!(
        "wrote {} ({} teeth, {} failed)",
        summary.results_dir.display(),
        summary.rows.len(),
        summary.failures.len()
    );
    Ok(())
}

fn cmd_angle(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing local maxima file")?);
    let mut config = AnalysisConfig::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cluster" => config.analysis.cluster_threshold = args.float("--cluster")?,
            "--cascade" => config.analysis.cascade_tolerance = args.float("--cascade")?,
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let points = load_local_maxima(&path).map_err(|e| format!("{}: {e}", path.display()))?;
    let report = analyze_cusps(&points, &config.analysis);

    match (report.principal_position, report.angle.as_ref()) {
        (Some(apex), Ok(angle)) => println!(
            "principal cusp ({}, {}, {}): {} rad, {} deg",
            apex.x,
            apex.y,
            apex.z,
            format_value(angle.radians),
            format_value(angle.degrees)
        ),
        (_, Err(reason)) => println!("no angle calculated: {reason}"),
        (None, Ok(_)) => println!("no angle calculated"),
    }
    println!("real cusps: {}", report.real_cusp_count);
    if !report.cascade.passes() {
        println!("fails inhibitory cascade");
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", SummaryRow::from_report(stem, &report).to_tsv());
    Ok(())
}

fn cmd_height(args: &mut Args) -> Result<(), String> {
    let dir = PathBuf::from(args.next().ok_or("missing mesh directory")?);
    let mut pattern = DEFAULT_PATTERN.to_string();
    let mut options = ReliefOptions::default();
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pattern" => pattern = args.value("--pattern")?,
            "--threshold" => options.min_relief = args.float("--threshold")?,
            "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let out_dir = out_dir.unwrap_or_else(|| dir.clone());
    let summary = batch::run_relief_batch(&dir, &pattern, &options, &out_dir).map_err(|e| e.to_string())?;

    for (path, relief) in &summary.tall_enough {
        println!("{} is tall enough with height {}", path.display(), format_value(*relief));
    }
    for (path, relief) in &summary.too_flat {
        println!("{} is too flat with height {}", path.display(), format_value(*relief));
    }
    for failure in &summary.failures {
        eprintln!("error processing {}: {}", failure.path.display(), failure.message);
    }
    eprintln!("wrote {}", out_dir.join(batch::TALL_ENOUGH_FILE).display());
    eprintln!("wrote {}", out_dir.join(batch::TOO_FLAT_FILE).display());
    Ok(())
}

fn cmd_normals(args: &mut Args) -> Result<(), String> {
    let path = PathBuf::from(args.next().ok_or("missing mesh file")?);
    let mut out: Option<PathBuf> = None;
    let mut overwrite = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out = Some(PathBuf::from(args.value("--out")?)),
            "--overwrite" => overwrite = true,
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let result = normals_for_file(&path).map_err(|e| format!("{}: {e}", path.display()))?;
    let normals = result.normals;
    let diagnostics = result.diagnostics;

    let mut text = String::new();
    for n in &normals.vertex {
        let _ = writeln!(text, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z);
    }

    if let Some(out) = out.as_deref() {
        write_text_file(out, &text, overwrite)?;
        eprintln!("wrote {}", out.display());
    } else {
        print!("{text}");
    }
    eprintln!("{}: {}", path.display(), diagnostics.summary());
    for warning in &diagnostics.warnings {
        eprintln!("warning: {warning}");
    }
    if let Some(timing) = result.timing {
        eprintln!(
            "timing: load {} ns, normals {} ns, total {:.3} ms",
            timing.load_ns,
            timing.normals_ns,
            timing.total_ms()
        );
    }
    Ok(())
}

fn cmd_combine(args: &mut Args) -> Result<(), String> {
    let opc_path = PathBuf::from(args.next().ok_or("missing OPC table")?);
    let cusp_path = PathBuf::from(args.next().ok_or("missing cusp table")?);
    let mut out: Option<PathBuf> = None;
    let mut overwrite = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out = Some(PathBuf::from(args.value("--out")?)),
            "--overwrite" => overwrite = true,
            other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
        }
    }

    let opc = read_text(&opc_path)?;
    let cusps = read_text(&cusp_path)?;
    let combined = combine_opc(&opc, &cusps).map_err(|e| e.to_string())?;

    let out = out.unwrap_or_else(|| opc_path.with_file_name(COMBINED_FILE));
    write_text_file(&out, &combined, overwrite)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))
}

fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
    if path.exists() && !overwrite {
        return Err(format!(
            "refusing to overwrite existing file {} (use --overwrite)",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
    }
    fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

struct Args {
    args: Vec<String>,
    pos: usize,
}

impl Args {
    fn new(args: Vec<String>) -> Self {
        Self { args, pos: 0 }
    }

    fn next(&mut self) -> Option<String> {
        let arg = self.args.get(self.pos)?.clone();
        self.pos += 1;
        Some(arg)
    }

    fn value(&mut self, flag: &str) -> Result<String, String> {
        self.next().ok_or_else(|| format!("missing value for {flag}"))
    }

    fn float(&mut self, flag: &str) -> Result<f64, String> {
        let raw = self.value(flag)?;
        raw.parse::<f64>()
            .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
    }
}
