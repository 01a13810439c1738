use crate::error::AlignmentError;
use crate::types::Opcode;

/// Maps one raw token to its comparison key.
pub trait WordNormalizer: Send + Sync {
    fn normalize(&self, token: &str) -> String;
}

/// Spells an all-digit string as words. `None` leaves the digits as-is.
pub trait NumberSpeller: Send + Sync {
    fn spell(&self, digits: &str) -> Option<String>;
}

/// Computes the edit script between the STT-side and reference-side keys.
///
/// Tags use the provider vocabulary: `Insert` covers reference-only tokens
/// and `Delete` STT-only tokens. Output must cover both sequences with
/// contiguous ranges; the aligner rejects anything else.
pub trait EditScriptProvider: Send + Sync {
    fn opcodes(&self, stt: &[String], reference: &[String]) -> Result<Vec<Opcode>, AlignmentError>;
}
