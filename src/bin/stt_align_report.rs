use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use stt_align::{
    aggregate_reports, compute_case_report, AlignerConfig, CaseReport, GapClosing, Meta, Report,
    SttTranscript, TranscriptAligner, TranscriptAlignerBuilder,
};
use tracing_subscriber::EnvFilter;

#[path = "stt_align_report/json_report_formatter.rs"]
mod json_report_formatter;

const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Timed reference words.
    Align,
    /// Classified diff segments.
    Diffs,
    /// Per-category word counts.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GapClosingChoice {
    Neighbours,
    Disabled,
}

impl From<GapClosingChoice> for GapClosing {
    fn from(choice: GapClosingChoice) -> Self {
        match choice {
            GapClosingChoice::Neighbours => GapClosing::Neighbours,
            GapClosingChoice::Disabled => GapClosing::Disabled,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stt_align_report")]
#[command(about = "Align reference transcripts with STT word timings and report the differences")]
struct Args {
    /// STT words JSON (`{"words": [...]}`).
    #[arg(long, env = "STT_ALIGN_STT")]
    stt: Option<PathBuf>,
    /// Reference transcript text file.
    #[arg(long, env = "STT_ALIGN_REFERENCE")]
    reference: Option<PathBuf>,
    #[arg(long, env = "STT_ALIGN_MODE", value_enum, default_value_t = Mode::Align)]
    mode: Mode,
    /// JSON list of `{id, stt_path, reference_path}`; paths are relative to the file.
    #[arg(long, env = "STT_ALIGN_CASES_FILE")]
    cases_file: Option<PathBuf>,
    #[arg(long, env = "STT_ALIGN_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "STT_ALIGN_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "STT_ALIGN_NO_AUTOJUNK", default_value_t = false)]
    no_autojunk: bool,
    #[arg(long, env = "STT_ALIGN_GAP_CLOSING", value_enum)]
    gap_closing: Option<GapClosingChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    stt_path: PathBuf,
    reference_path: PathBuf,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let aligner = TranscriptAlignerBuilder::new(config.clone())
        .build()
        .map_err(|err| format!("Failed to build aligner: {err}"))?;

    match (&args.cases_file, &args.stt, &args.reference) {
        (Some(cases_file), None, None) => run_batch(&args, cases_file, &aligner, &config),
        (None, Some(stt_path), Some(reference_path)) => {
            run_single(&args, stt_path, reference_path, &aligner)
        }
        (Some(_), _, _) => {
            Err("--cases-file cannot be combined with --stt/--reference.".to_string())
        }
        _ => Err("Provide either --cases-file, or both --stt and --reference.".to_string()),
    }
}

fn resolve_config(args: &Args) -> Result<AlignerConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => {
            require_path_exists(path, "Missing --config path.")?;
            AlignerConfig::load(path)
                .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?
        }
        None => AlignerConfig::default(),
    };
    if args.no_autojunk {
        config.autojunk = false;
    }
    if let Some(choice) = args.gap_closing {
        config.gap_closing = choice.into();
    }
    Ok(config)
}

fn run_single(
    args: &Args,
    stt_path: &Path,
    reference_path: &Path,
    aligner: &TranscriptAligner,
) -> Result<(), String> {
    let stt = read_stt(stt_path)?;
    let reference = read_reference(reference_path)?;
    let label = stt_path.display();

    let started = Instant::now();
    let written = match args.mode {
        Mode::Align => {
            let transcript = aligner
                .align(&stt, &reference)
                .map_err(|err| format!("{label}: align() failed: {err}"))?;
            json_report_formatter::write_json(args.out.as_deref(), &transcript)
        }
        Mode::Diffs => {
            let segments = aligner
                .diffs_list(&stt, &reference)
                .map_err(|err| format!("{label}: diffs_list() failed: {err}"))?;
            json_report_formatter::write_json(args.out.as_deref(), &segments)
        }
        Mode::Count => {
            let counts = aligner
                .diffs_count(&stt, &reference)
                .map_err(|err| format!("{label}: diffs_count() failed: {err}"))?;
            json_report_formatter::write_json(args.out.as_deref(), &counts)
        }
    };
    written?;

    tracing::info!(
        elapsed = %format_duration_hms(started.elapsed()),
        mode = ?args.mode,
        "single alignment complete"
    );
    if let Some(out) = args.out.as_ref() {
        println!("{}", out.display());
    }
    Ok(())
}

fn run_batch(
    args: &Args,
    cases_file: &Path,
    aligner: &TranscriptAligner,
    config: &AlignerConfig,
) -> Result<(), String> {
    let cases = load_cases(cases_file)?;
    if cases.is_empty() {
        return Err(format!("No cases listed in '{}'.", cases_file.display()));
    }
    let cases_root = cases_file.parent().unwrap_or_else(|| Path::new("."));
    let out_path = resolve_out_path(args.out.as_ref());

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut case_reports: Vec<CaseReport> = Vec::with_capacity(cases.len());
    let mut lib_work_elapsed = Duration::ZERO;
    for case in &cases {
        progress.set_message(case.id.clone());
        let stt = read_stt(&cases_root.join(&case.stt_path))?;
        let reference = read_reference(&cases_root.join(&case.reference_path))?;

        let lib_started = Instant::now();
        let (output, counts) = aligner
            .align_and_count(&stt, &reference)
            .map_err(|err| format!("{}: align_and_count() failed: {err}", case.id))?;
        lib_work_elapsed += lib_started.elapsed();

        let case_report = compute_case_report(&case.id, stt.words.len(), counts, output.report)
            .map_err(|err| format!("{}: metric computation failed: {err}", case.id))?;
        case_reports.push(case_report);
        progress.inc(1);
    }
    progress.finish_with_message("alignment pass complete");

    let lib_work_seconds = lib_work_elapsed.as_secs_f64();
    println!(
        "lib_work_elapsed: {:.2}s ({}) avg_per_case: {:.2}ms",
        lib_work_seconds,
        format_duration_hms(lib_work_elapsed),
        lib_work_seconds * 1000.0 / case_reports.len() as f64
    );

    let aggregates = aggregate_reports(&case_reports);
    let report = Report {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            case_count: case_reports.len(),
            autojunk: config.autojunk,
            gap_closing: config.gap_closing,
        },
        cases: case_reports,
        aggregates,
    };
    json_report_formatter::write_json(Some(&out_path), &report)?;
    println!("{}", out_path.display());
    Ok(())
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    require_path_exists(path, "Missing --cases-file path.")?;
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases file '{}': {err}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|err| format!("Failed to parse cases file '{}': {err}", path.display()))
}

fn read_stt(path: &Path) -> Result<SttTranscript, String> {
    require_path_exists(path, "Missing STT words file.")?;
    let file = fs::File::open(path)
        .map_err(|err| format!("Failed to open STT file '{}': {err}", path.display()))?;
    SttTranscript::from_reader(std::io::BufReader::new(file))
        .map_err(|err| format!("Failed to load STT file '{}': {err}", path.display()))
}

fn read_reference(path: &Path) -> Result<String, String> {
    require_path_exists(path, "Missing reference transcript file.")?;
    fs::read_to_string(path)
        .map_err(|err| format!("Failed to read reference '{}': {err}", path.display()))
}

fn resolve_out_path(out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return path.clone();
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("target")
        .join("stt_align_reports")
        .join(format!("stt-align-report-{run_id}.json"))
}

fn format_duration_hms(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
