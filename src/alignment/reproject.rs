use crate::error::AlignmentError;
use crate::types::{EditTag, Opcode, SttWord, WordSlot};

/// Lays STT timing onto the reference tokens. Only `equal` opcodes carry
/// timing; every other reference position stays an untimed slot for the
/// interpolator. Slot words are always the reference tokens.
pub fn reproject(
    opcodes: &[Opcode],
    stt_words: &[SttWord],
    reference_tokens: &[String],
) -> Result<Vec<WordSlot>, AlignmentError> {
    let mut slots = vec![WordSlot::default(); reference_tokens.len()];

    for op in opcodes {
        tracing::trace!(
            tag = op.tag.as_str(),
            stt_start = op.stt.start,
            stt_end = op.stt.end,
            reference_start = op.reference.start,
            reference_end = op.reference.end,
            "reproject: opcode"
        );
        if op.tag != EditTag::Equal {
            continue;
        }
        if op.stt.len() != op.reference.len() {
            return Err(AlignmentError::opcode_violation(format!(
                "equal opcode pairs {} STT words with {} reference words",
                op.stt.len(),
                op.reference.len()
            )));
        }

        let stt_segment = stt_words.get(op.stt.clone()).ok_or_else(|| {
            AlignmentError::opcode_violation(format!(
                "equal opcode STT range {:?} is out of bounds for {} words",
                op.stt,
                stt_words.len()
            ))
        })?;
        let slot_segment = slots.get_mut(op.reference.clone()).ok_or_else(|| {
            AlignmentError::opcode_violation(format!(
                "equal opcode reference range {:?} is out of bounds for {} tokens",
                op.reference,
                reference_tokens.len()
            ))
        })?;

        for (slot, stt_word) in slot_segment.iter_mut().zip(stt_segment) {
            slot.start = Some(stt_word.start);
            slot.end = Some(stt_word.end);
        }
    }

    for (slot, token) in slots.iter_mut().zip(reference_tokens) {
        slot.word.clone_from(token);
    }
    Ok(slots)
}
