use std::cmp::Ordering;

use serde::Serialize;

use crate::config::GapClosing;
use crate::error::AlignmentError;
use crate::types::{AlignedWord, DiffCounts};

const OUTLIER_TOP_N: usize = 20;

/// Structural checks over one aligned transcript. Interpolation does not
/// guarantee `start <= end` or monotonic starts, so violations are counted
/// here instead of being assumed away.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingReport {
    pub word_count: u32,
    /// Words whose timing came straight from an `equal` STT match.
    pub matched_word_count: u32,
    pub interpolated_word_count: u32,
    /// Words with `end < start`.
    pub negative_duration_word_count: u32,
    pub overlap_word_count: u32,
    pub non_monotonic_word_count: u32,
    /// Silence between consecutive words over the transcript span.
    pub gap_ratio: f32,
    pub overlap_ratio: f32,
    pub notes: Vec<String>,
}

impl TimingReport {
    pub fn has_timing_violations(&self) -> bool {
        self.negative_duration_word_count > 0 || self.non_monotonic_word_count > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
    pub aggregates: AggregateReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub case_count: usize,
    pub autojunk: bool,
    pub gap_closing: GapClosing,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub stt_word_count: u32,
    pub reference_word_count: u32,
    pub counts: DiffCounts,
    pub word_error_rate: f32,
    pub timing: TimingReport,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub counts: AggregateCounts,
    pub totals: DiffCounts,
    /// Pooled over every reference word in the batch.
    pub word_error_rate: f32,
    pub word_error_rate_distribution: Option<MetricDistribution>,
    pub interpolated_ratio_distribution: Option<MetricDistribution>,
    pub outliers: OutlierReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateCounts {
    pub total: u32,
    pub with_timing_violations: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDistribution {
    pub mean: f32,
    pub p50: f32,
    pub p90: f32,
    pub p95: f32,
    pub p99: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub worst_word_error_rate: Vec<OutlierEntry>,
    pub worst_interpolated_ratio: Vec<OutlierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierEntry {
    pub id: String,
    pub value: f32,
}

/// Never fails: ratios that do not fit an `f32` are saturated and noted, so
/// a valid alignment always gets a report.
pub fn compute_timing_report(words: &[AlignedWord], matched_word_count: usize) -> TimingReport {
    let mut notes = Vec::new();
    if words.is_empty() {
        notes.push("no_words".to_string());
    }

    let negative_duration_word_count = words.iter().filter(|w| w.end < w.start).count();
    let mut overlap_word_count = 0usize;
    let mut non_monotonic_word_count = 0usize;
    let mut gap_sec = 0.0f64;
    let mut overlap_sec = 0.0f64;

    for pair in words.windows(2) {
        let current = &pair[0];
        let next = &pair[1];

        if current.end > next.start {
            overlap_word_count += 1;
            overlap_sec += current.end - next.start;
        } else {
            gap_sec += next.start - current.end;
        }

        if current.start > next.start {
            non_monotonic_word_count += 1;
        }
    }

    let span_sec = match (words.first(), words.last()) {
        (Some(first), Some(last)) => last.end.max(last.start) - first.start.min(first.end),
        _ => 0.0,
    };
    let ratio = |value: f64| if span_sec > 0.0 { value / span_sec } else { 0.0 };
    let gap_ratio = saturating_f32(ratio(gap_sec), "gap_ratio", &mut notes);
    let overlap_ratio = saturating_f32(ratio(overlap_sec), "overlap_ratio", &mut notes);

    if negative_duration_word_count > 0 {
        notes.push(format!("negative_duration_words={negative_duration_word_count}"));
    }
    if non_monotonic_word_count > 0 {
        notes.push(format!("non_monotonic_words={non_monotonic_word_count}"));
    }
    let matched_word_count = matched_word_count.min(words.len());
    if matched_word_count == 0 && !words.is_empty() {
        notes.push("no_matched_words".to_string());
    }

    TimingReport {
        word_count: to_u32(words.len()),
        matched_word_count: to_u32(matched_word_count),
        interpolated_word_count: to_u32(words.len() - matched_word_count),
        negative_duration_word_count: to_u32(negative_duration_word_count),
        overlap_word_count: to_u32(overlap_word_count),
        non_monotonic_word_count: to_u32(non_monotonic_word_count),
        gap_ratio,
        overlap_ratio,
        notes,
    }
}

pub fn compute_case_report(
    id: &str,
    stt_word_count: usize,
    counts: DiffCounts,
    timing: TimingReport,
) -> Result<CaseReport, AlignmentError> {
    let mut notes = Vec::new();
    if stt_word_count == 0 {
        notes.push("no_stt_words".to_string());
    }
    if counts.equal == 0 {
        notes.push("no_equal_matches".to_string());
    }
    if timing.has_timing_violations() {
        notes.push("timing_violations".to_string());
    }

    Ok(CaseReport {
        id: id.to_string(),
        stt_word_count: to_u32(stt_word_count),
        reference_word_count: to_u32(counts.base_text_total_word_count),
        counts,
        word_error_rate: checked_f32(counts.word_error_rate(), "case.word_error_rate")?,
        timing,
        notes,
    })
}

pub fn aggregate_reports(cases: &[CaseReport]) -> AggregateReport {
    let mut totals = DiffCounts::default();
    let mut wer_values = Vec::with_capacity(cases.len());
    let mut interpolated_values = Vec::with_capacity(cases.len());

    for case in cases {
        totals.equal += case.counts.equal;
        totals.insert += case.counts.insert;
        totals.delete += case.counts.delete;
        totals.replace += case.counts.replace;
        totals.base_text_total_word_count += case.counts.base_text_total_word_count;
        wer_values.push(case.word_error_rate as f64);
        interpolated_values.push(interpolated_ratio(case));
    }

    AggregateReport {
        counts: AggregateCounts {
            total: to_u32(cases.len()),
            with_timing_violations: to_u32(
                cases
                    .iter()
                    .filter(|case| case.timing.has_timing_violations())
                    .count(),
            ),
        },
        totals,
        word_error_rate: totals.word_error_rate() as f32,
        word_error_rate_distribution: distribution_or_none(&wer_values),
        interpolated_ratio_distribution: distribution_or_none(&interpolated_values),
        outliers: OutlierReport {
            worst_word_error_rate: ranked_outliers(cases, OUTLIER_TOP_N, |case| {
                case.word_error_rate as f64
            }),
            worst_interpolated_ratio: ranked_outliers(cases, OUTLIER_TOP_N, interpolated_ratio),
        },
    }
}

fn interpolated_ratio(case: &CaseReport) -> f64 {
    if case.timing.word_count == 0 {
        0.0
    } else {
        case.timing.interpolated_word_count as f64 / case.timing.word_count as f64
    }
}

fn ranked_outliers(
    cases: &[CaseReport],
    top_n: usize,
    metric: impl Fn(&CaseReport) -> f64,
) -> Vec<OutlierEntry> {
    let mut entries: Vec<OutlierEntry> = cases
        .iter()
        .map(|case| OutlierEntry {
            id: case.id.clone(),
            value: metric(case) as f32,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    entries.truncate(top_n);
    entries
}

fn distribution_or_none(values: &[f64]) -> Option<MetricDistribution> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    Some(MetricDistribution {
        mean: checked_f32(mean(&sorted), "aggregate.mean").ok()?,
        p50: checked_f32(percentile_sorted(&sorted, 0.5), "aggregate.p50").ok()?,
        p90: checked_f32(percentile_sorted(&sorted, 0.9), "aggregate.p90").ok()?,
        p95: checked_f32(percentile_sorted(&sorted, 0.95), "aggregate.p95").ok()?,
        p99: checked_f32(percentile_sorted(&sorted, 0.99), "aggregate.p99").ok()?,
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn percentile_sorted(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let clamped = percentile.clamp(0.0, 1.0);
    let max_index = (sorted_values.len() - 1) as f64;
    let rank = clamped * max_index;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted_values[lower]
    } else {
        let weight = rank - lower as f64;
        sorted_values[lower] * (1.0 - weight) + sorted_values[upper] * weight
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, AlignmentError> {
    if !value.is_finite() {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' produced non-finite value: {value}"
        )));
    }
    if value < f32::MIN as f64 || value > f32::MAX as f64 {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' out of f32 range: {value}"
        )));
    }
    Ok(value as f32)
}

/// Ratios are non-negative; NaN and anything past `f32::MAX` saturate.
fn saturating_f32(value: f64, metric_name: &str, notes: &mut Vec<String>) -> f32 {
    if value.is_finite() && value <= f32::MAX as f64 {
        return value.max(0.0) as f32;
    }
    notes.push(format!("{metric_name}_saturated"));
    f32::MAX
}
