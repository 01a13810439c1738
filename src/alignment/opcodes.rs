use crate::error::AlignmentError;
use crate::types::{EditTag, Opcode};

/// Checks that an edit script walks both sequences front to back with no
/// gaps or overlaps and that each tag agrees with its range shapes.
pub fn validate_opcodes(
    opcodes: &[Opcode],
    stt_len: usize,
    reference_len: usize,
) -> Result<(), AlignmentError> {
    let mut stt_cursor = 0usize;
    let mut reference_cursor = 0usize;

    for (idx, op) in opcodes.iter().enumerate() {
        if op.stt.start > op.stt.end || op.reference.start > op.reference.end {
            return Err(AlignmentError::opcode_violation(format!(
                "opcode #{idx} ({}) has a reversed range: stt {:?}, reference {:?}",
                op.tag.as_str(),
                op.stt,
                op.reference
            )));
        }
        if op.stt.start != stt_cursor || op.reference.start != reference_cursor {
            return Err(AlignmentError::opcode_violation(format!(
                "opcode #{idx} ({}) starts at stt {} / reference {} but the previous opcode ended at stt {} / reference {}",
                op.tag.as_str(),
                op.stt.start,
                op.reference.start,
                stt_cursor,
                reference_cursor
            )));
        }

        let stt_span = op.stt.len();
        let reference_span = op.reference.len();
        let shape_ok = match op.tag {
            EditTag::Equal => stt_span == reference_span,
            EditTag::Insert => stt_span == 0 && reference_span > 0,
            EditTag::Delete => stt_span > 0 && reference_span == 0,
            EditTag::Replace => stt_span > 0 && reference_span > 0,
        };
        if !shape_ok {
            return Err(AlignmentError::opcode_violation(format!(
                "opcode #{idx} ({}) spans {stt_span} STT and {reference_span} reference tokens",
                op.tag.as_str()
            )));
        }

        stt_cursor = op.stt.end;
        reference_cursor = op.reference.end;
    }

    if stt_cursor != stt_len || reference_cursor != reference_len {
        return Err(AlignmentError::opcode_violation(format!(
            "edit script covers stt 0..{stt_cursor} and reference 0..{reference_cursor}, expected 0..{stt_len} and 0..{reference_len}"
        )));
    }
    Ok(())
}
