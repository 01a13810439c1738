use crate::alignment::normalize::normalize_token_with;
use crate::alignment::number_words::spell_number;
use crate::alignment::sequence_matcher::SequenceMatcher;
use crate::error::AlignmentError;
use crate::pipeline::traits::{EditScriptProvider, NumberSpeller, WordNormalizer};
use crate::types::Opcode;

pub struct EnglishNumberSpeller;

impl NumberSpeller for EnglishNumberSpeller {
    fn spell(&self, digits: &str) -> Option<String> {
        spell_number(digits)
    }
}

/// Lowercase, `[a-z0-9]` only, numerals spelled through `speller`.
pub struct StandardNormalizer {
    speller: Box<dyn NumberSpeller>,
}

impl StandardNormalizer {
    pub fn new(speller: Box<dyn NumberSpeller>) -> Self {
        Self { speller }
    }
}

impl Default for StandardNormalizer {
    fn default() -> Self {
        Self::new(Box::new(EnglishNumberSpeller))
    }
}

impl WordNormalizer for StandardNormalizer {
    fn normalize(&self, token: &str) -> String {
        normalize_token_with(token, |digits| self.speller.spell(digits))
    }
}

pub struct SequenceMatcherProvider {
    autojunk: bool,
}

impl SequenceMatcherProvider {
    pub fn new(autojunk: bool) -> Self {
        Self { autojunk }
    }
}

impl Default for SequenceMatcherProvider {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EditScriptProvider for SequenceMatcherProvider {
    fn opcodes(&self, stt: &[String], reference: &[String]) -> Result<Vec<Opcode>, AlignmentError> {
        Ok(SequenceMatcher::new(stt, reference, self.autojunk).opcodes())
    }
}
