use crate::alignment::classify::{classify, count_diffs};
use crate::alignment::interpolate::interpolate;
use crate::alignment::opcodes::validate_opcodes;
use crate::alignment::report::compute_timing_report;
use crate::alignment::reproject::reproject;
use crate::alignment::tokenization::reference_tokens;
use crate::config::GapClosing;
use crate::error::AlignmentError;
use crate::pipeline::builder::TranscriptAlignerBuilder;
use crate::pipeline::traits::{EditScriptProvider, WordNormalizer};
use crate::types::{
    AlignedTranscript, AlignmentOutput, DiffCounts, DiffSegment, Opcode, SttTranscript,
};

/// Aligns STT output against reference text. Holds no per-call state, so a
/// single instance can be shared across threads.
pub struct TranscriptAligner {
    gap_closing: GapClosing,
    normalizer: Box<dyn WordNormalizer>,
    edit_script_provider: Box<dyn EditScriptProvider>,
}

pub(crate) struct TranscriptAlignerParts {
    pub gap_closing: GapClosing,
    pub normalizer: Box<dyn WordNormalizer>,
    pub edit_script_provider: Box<dyn EditScriptProvider>,
}

/// Reference tokens plus the validated edit script against them.
struct EditScript {
    reference_tokens: Vec<String>,
    opcodes: Vec<Opcode>,
}

impl TranscriptAligner {
    pub(crate) fn from_parts(parts: TranscriptAlignerParts) -> Self {
        Self {
            gap_closing: parts.gap_closing,
            normalizer: parts.normalizer,
            edit_script_provider: parts.edit_script_provider,
        }
    }

    pub fn opcodes(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<Vec<Opcode>, AlignmentError> {
        Ok(self.edit_script(stt, reference_text)?.opcodes)
    }

    pub fn align(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<AlignedTranscript, AlignmentError> {
        Ok(self.align_with_report(stt, reference_text)?.transcript)
    }

    pub fn align_with_report(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<AlignmentOutput, AlignmentError> {
        let script = self.edit_script(stt, reference_text)?;
        self.align_script(&script, stt, reference_text)
    }

    /// Alignment and diff counts from a single edit script, for callers that
    /// need both.
    pub fn align_and_count(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<(AlignmentOutput, DiffCounts), AlignmentError> {
        let script = self.edit_script(stt, reference_text)?;
        let counts = count_diffs(&script.opcodes, &stt.words, &script.reference_tokens)?;
        let output = self.align_script(&script, stt, reference_text)?;
        Ok((output, counts))
    }

    fn align_script(
        &self,
        script: &EditScript,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<AlignmentOutput, AlignmentError> {
        let slots = reproject(&script.opcodes, &stt.words, &script.reference_tokens)?;
        let matched = slots.iter().filter(|slot| slot.has_timing()).count();
        let words = interpolate(slots, self.gap_closing)?;
        let report = compute_timing_report(&words, matched);

        if report.has_timing_violations() {
            tracing::warn!(
                negative_duration_words = report.negative_duration_word_count,
                non_monotonic_words = report.non_monotonic_word_count,
                words = report.word_count,
                "aligned transcript has inverted or out-of-order timings"
            );
        }
        tracing::debug!(
            words = report.word_count,
            matched = report.matched_word_count,
            interpolated = report.interpolated_word_count,
            "align: done"
        );

        Ok(AlignmentOutput {
            transcript: AlignedTranscript {
                text: reference_text.to_string(),
                words,
            },
            report,
        })
    }

    pub fn diffs_list(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<Vec<DiffSegment>, AlignmentError> {
        let script = self.edit_script(stt, reference_text)?;
        classify(&script.opcodes, &stt.words, &script.reference_tokens)
    }

    pub fn diffs_count(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<DiffCounts, AlignmentError> {
        let script = self.edit_script(stt, reference_text)?;
        count_diffs(&script.opcodes, &stt.words, &script.reference_tokens)
    }

    fn edit_script(
        &self,
        stt: &SttTranscript,
        reference_text: &str,
    ) -> Result<EditScript, AlignmentError> {
        let reference_tokens = reference_tokens(reference_text);
        if reference_tokens.is_empty() {
            return Err(AlignmentError::invalid_input(
                "reference text contains no words",
            ));
        }

        let reference_keys: Vec<String> = reference_tokens
            .iter()
            .map(|token| self.normalizer.normalize(token))
            .collect();
        if reference_keys.iter().all(String::is_empty) {
            return Err(AlignmentError::invalid_input(
                "every reference word normalizes to an empty key",
            ));
        }
        let stt_keys: Vec<String> = stt
            .words
            .iter()
            .map(|word| self.normalizer.normalize(&word.word))
            .collect();

        let opcodes = self
            .edit_script_provider
            .opcodes(&stt_keys, &reference_keys)?;
        validate_opcodes(&opcodes, stt_keys.len(), reference_keys.len())?;

        tracing::debug!(
            stt_words = stt_keys.len(),
            reference_words = reference_keys.len(),
            opcodes = opcodes.len(),
            "edit script computed"
        );

        Ok(EditScript {
            reference_tokens,
            opcodes,
        })
    }
}

/// Aligns with the default collaborators and configuration.
pub fn align_stt(
    stt: &SttTranscript,
    reference_text: &str,
) -> Result<AlignedTranscript, AlignmentError> {
    TranscriptAlignerBuilder::default()
        .build()?
        .align(stt, reference_text)
}

pub fn diffs_list(
    stt: &SttTranscript,
    reference_text: &str,
) -> Result<Vec<DiffSegment>, AlignmentError> {
    TranscriptAlignerBuilder::default()
        .build()?
        .diffs_list(stt, reference_text)
}

pub fn diffs_count(stt: &SttTranscript, reference_text: &str) -> Result<DiffCounts, AlignmentError> {
    TranscriptAlignerBuilder::default()
        .build()?
        .diffs_count(stt, reference_text)
}
