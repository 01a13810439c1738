use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use stt_align::{
    AlignedWord, AlignerConfig, DiffCounts, GapClosing, MatchType, SttTranscript,
    TranscriptAligner, TranscriptAlignerBuilder,
};

const DEFAULT_SAMPLE_SIZE: usize = 50;
const DEFAULT_TOLERANCE_S: f64 = 1e-6;
const DEFAULT_SAMPLE_SEED: u64 = 42;
const SUITE_NAME: &str = "reference_alignment_matches_fixture";

#[derive(Debug, Deserialize)]
struct AlignmentCase {
    id: String,
    reference: String,
    #[serde(default)]
    gap_closing: GapClosing,
    stt: serde_json::Value,
    expected_words: Option<Vec<AlignedWord>>,
    expected_counts: Option<DiffCounts>,
    expected_match_types: Option<Vec<MatchType>>,
}

fn main() {
    let args = Arguments::from_args();

    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_mode = env_flag("STT_ALIGN_IT_FULL");
    let sample_seed = env_u64("STT_ALIGN_IT_SEED", DEFAULT_SAMPLE_SEED);
    let tolerance_s = env_f64("STT_ALIGN_IT_TOLERANCE_S", DEFAULT_TOLERANCE_S);

    let all_cases = match load_all_cases(&repo_root.join("test-data/alignments")) {
        Ok(cases) => cases,
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };
    if all_cases.is_empty() {
        run_setup_failure(
            &args,
            "No alignment cases found under test-data/alignments.".to_string(),
        );
        return;
    }

    let sampled_ids = select_case_ids(&all_cases, full_mode, sample_seed);
    let mut tests = Vec::with_capacity(all_cases.len());
    for case in all_cases {
        let test_name = format!("{SUITE_NAME}::case::{}", case.id);
        let run_by_default = sampled_ids.contains(&case.id);
        let should_ignore = !run_by_default && !matches_filter(&args, &test_name);

        tests.push(
            Trial::test(test_name, move || {
                run_alignment_case(&case, tolerance_s).map_err(Failed::from)
            })
            .with_ignored_flag(should_ignore),
        );
    }

    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || {
        Err(Failed::from(message))
    });
    libtest_mimic::run(args, vec![test]).exit();
}

fn run_alignment_case(case: &AlignmentCase, tolerance_s: f64) -> Result<(), String> {
    let stt = SttTranscript::from_json_str(&case.stt.to_string())
        .map_err(|err| format!("{}: invalid STT fixture: {err}", case.id))?;
    let aligner = build_aligner(case.gap_closing)?;

    if let Some(expected) = case.expected_words.as_ref() {
        let output = aligner
            .align(&stt, &case.reference)
            .map_err(|err| format!("{}: align() failed: {err}", case.id))?;
        if output.text != case.reference {
            return Err(format!("{}: output text differs from the reference", case.id));
        }
        compare_words(&case.id, expected, &output.words, tolerance_s)?;
    }

    if let Some(expected) = case.expected_counts.as_ref() {
        let counts = aligner
            .diffs_count(&stt, &case.reference)
            .map_err(|err| format!("{}: diffs_count() failed: {err}", case.id))?;
        if &counts != expected {
            return Err(format!(
                "{}: counts mismatch (expected {expected:?}, got {counts:?})",
                case.id
            ));
        }
        if counts.equal + counts.delete + counts.replace != counts.base_text_total_word_count {
            return Err(format!(
                "{}: equal + delete + replace does not reconcile with the reference total",
                case.id
            ));
        }
    }

    if let Some(expected) = case.expected_match_types.as_ref() {
        let segments = aligner
            .diffs_list(&stt, &case.reference)
            .map_err(|err| format!("{}: diffs_list() failed: {err}", case.id))?;
        let observed: Vec<MatchType> = segments.iter().map(|s| s.match_type).collect();
        if &observed != expected {
            return Err(format!(
                "{}: match types mismatch (expected {expected:?}, got {observed:?})",
                case.id
            ));
        }
        for (idx, segment) in segments.iter().enumerate() {
            let shape_ok = match segment.match_type {
                MatchType::Insert => segment.base_text.is_none() && segment.stt.is_some(),
                MatchType::Delete => segment.stt.is_none() && segment.base_text.is_some(),
                MatchType::Equal | MatchType::Replace => {
                    segment.stt.is_some() && segment.base_text.is_some()
                }
            };
            if !shape_ok {
                return Err(format!(
                    "{}: segment #{idx} ({}) has the wrong sides present",
                    case.id,
                    segment.match_type.as_str()
                ));
            }
        }
    }

    Ok(())
}

fn compare_words(
    id: &str,
    expected_words: &[AlignedWord],
    observed_words: &[AlignedWord],
    tolerance_s: f64,
) -> Result<(), String> {
    if observed_words.len() != expected_words.len() {
        return Err(format!(
            "{id}: word count mismatch (expected {}, got {})",
            expected_words.len(),
            observed_words.len()
        ));
    }

    let mut off = Vec::new();
    for (idx, (expected, observed)) in expected_words.iter().zip(observed_words).enumerate() {
        if observed.word != expected.word {
            return Err(format!(
                "{id}: word mismatch at index {idx} (expected '{}', got '{}')",
                expected.word, observed.word
            ));
        }
        let start_diff = (observed.start - expected.start).abs();
        let end_diff = (observed.end - expected.end).abs();
        if start_diff > tolerance_s || end_diff > tolerance_s {
            off.push(format!(
                "#{idx} '{}' (expected {:.4}-{:.4}, got {:.4}-{:.4})",
                expected.word, expected.start, expected.end, observed.start, observed.end
            ));
        }
    }

    if off.is_empty() {
        return Ok(());
    }
    Err(format!(
        "{id}: {} word(s) outside tolerance {tolerance_s}s: {}",
        off.len(),
        off.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    ))
}

fn build_aligner(gap_closing: GapClosing) -> Result<TranscriptAligner, String> {
    let config = AlignerConfig {
        gap_closing,
        ..AlignerConfig::default()
    };
    TranscriptAlignerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build TranscriptAligner: {err}"))
}

fn load_all_cases(fixture_dir: &Path) -> Result<Vec<AlignmentCase>, String> {
    require_path_exists(fixture_dir, "Missing alignment fixture directory.")?;
    let mut paths: Vec<PathBuf> = fs::read_dir(fixture_dir)
        .map_err(|err| format!("Failed to list '{}': {err}", fixture_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut cases = Vec::new();
    for path in paths {
        cases.extend(load_fixture_file(&path)?);
    }

    let mut seen = HashSet::new();
    for case in &cases {
        if !seen.insert(case.id.as_str()) {
            return Err(format!("Duplicate alignment case id '{}'.", case.id));
        }
    }
    Ok(cases)
}

fn load_fixture_file(path: &Path) -> Result<Vec<AlignmentCase>, String> {
    let file = File::open(path)
        .map_err(|err| format!("Failed to open fixture '{}': {err}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse fixture '{}': {err}", path.display()))
}

fn select_case_ids(cases: &[AlignmentCase], full_mode: bool, seed: u64) -> HashSet<String> {
    if full_mode || cases.len() <= DEFAULT_SAMPLE_SIZE {
        return cases.iter().map(|case| case.id.clone()).collect();
    }

    let mut indices: Vec<usize> = (0..cases.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices
        .into_iter()
        .take(DEFAULT_SAMPLE_SIZE)
        .map(|idx| cases[idx].id.clone())
        .collect()
}

fn matches_filter(args: &Arguments, test_name: &str) -> bool {
    match args.filter.as_deref() {
        None => false,
        Some(filter) if args.exact => test_name == filter,
        Some(filter) => test_name.contains(filter),
    }
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}

fn env_flag(name: &str) -> bool {
    match env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn env_f64(name: &str, default: f64) -> f64 {
    match env::var(name) {
        Ok(value) => value.trim().parse::<f64>().unwrap_or_else(|err| {
            panic!("Invalid value for {name}='{value}' (expected f64): {err}")
        }),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or_else(|err| {
            panic!("Invalid value for {name}='{value}' (expected u64): {err}")
        }),
        Err(_) => default,
    }
}
