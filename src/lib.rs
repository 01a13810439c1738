pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::normalize::normalize_word;
pub use alignment::report::{
    aggregate_reports, compute_case_report, compute_timing_report, AggregateReport, CaseReport,
    Meta, Report, TimingReport,
};
pub use config::{AlignerConfig, GapClosing};
pub use error::AlignmentError;
pub use pipeline::builder::TranscriptAlignerBuilder;
pub use pipeline::runtime::{align_stt, diffs_count, diffs_list, TranscriptAligner};
pub use pipeline::traits::{EditScriptProvider, NumberSpeller, WordNormalizer};
pub use types::{
    AlignedTranscript, AlignedWord, AlignmentOutput, DiffCounts, DiffSegment, EditTag, MatchType,
    Opcode, SttTranscript, SttWord,
};
