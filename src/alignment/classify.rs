use crate::error::AlignmentError;
use crate::types::{DiffCounts, DiffSegment, EditTag, MatchType, Opcode, SttWord};

/// Reported category, indexed by provider tag in `EditTag` declaration
/// order. The reference text is ground truth, so reference-only tokens
/// (provider `Insert`) were dropped by the STT and STT-only tokens (provider
/// `Delete`) were added by it.
const REPORTED_MATCH_TYPE: [MatchType; 4] = [
    MatchType::Equal,   // EditTag::Equal
    MatchType::Delete,  // EditTag::Insert
    MatchType::Insert,  // EditTag::Delete
    MatchType::Replace, // EditTag::Replace
];

pub fn reported_match_type(tag: EditTag) -> MatchType {
    REPORTED_MATCH_TYPE[tag as usize]
}

/// One segment per opcode, in opcode order. The side a reported category
/// does not have (STT for `delete`, reference for `insert`) is `None`.
pub fn classify(
    opcodes: &[Opcode],
    stt_words: &[SttWord],
    reference_tokens: &[String],
) -> Result<Vec<DiffSegment>, AlignmentError> {
    opcodes
        .iter()
        .map(|op| {
            let match_type = reported_match_type(op.tag);
            let (stt, base_text) = slices(op, stt_words, reference_tokens)?;
            Ok(DiffSegment {
                match_type,
                stt: (match_type != MatchType::Delete).then(|| stt.to_vec()),
                base_text: (match_type != MatchType::Insert).then(|| base_text.to_vec()),
            })
        })
        .collect()
}

/// Word tally per reported category. `insert` counts STT words; every other
/// category counts reference words, so `equal + delete + replace` equals
/// the reference word count.
pub fn count_diffs(
    opcodes: &[Opcode],
    stt_words: &[SttWord],
    reference_tokens: &[String],
) -> Result<DiffCounts, AlignmentError> {
    let mut counts = DiffCounts {
        base_text_total_word_count: reference_tokens.len(),
        ..DiffCounts::default()
    };

    for op in opcodes {
        let (stt, base_text) = slices(op, stt_words, reference_tokens)?;
        match reported_match_type(op.tag) {
            MatchType::Equal => counts.equal += base_text.len(),
            MatchType::Insert => counts.insert += stt.len(),
            MatchType::Delete => counts.delete += base_text.len(),
            MatchType::Replace => counts.replace += base_text.len(),
        }
    }
    Ok(counts)
}

fn slices<'a>(
    op: &Opcode,
    stt_words: &'a [SttWord],
    reference_tokens: &'a [String],
) -> Result<(&'a [SttWord], &'a [String]), AlignmentError> {
    let stt = stt_words.get(op.stt.clone()).ok_or_else(|| {
        AlignmentError::opcode_violation(format!(
            "{} opcode STT range {:?} is out of bounds for {} words",
            op.tag.as_str(),
            op.stt,
            stt_words.len()
        ))
    })?;
    let base_text = reference_tokens.get(op.reference.clone()).ok_or_else(|| {
        AlignmentError::opcode_violation(format!(
            "{} opcode reference range {:?} is out of bounds for {} tokens",
            op.tag.as_str(),
            op.reference,
            reference_tokens.len()
        ))
    })?;
    Ok((stt, base_text))
}
