use crate::alignment::number_words::spell_number;

/// Comparison key for a word: lowercase, keep only `[a-z0-9]`, spell out
/// all-digit keys. Absent input stays absent.
pub fn normalize_word(word: Option<&str>) -> Option<String> {
    word.map(normalize_token)
}

pub fn normalize_token(token: &str) -> String {
    normalize_token_with(token, spell_number)
}

/// Same as [`normalize_token`] with a caller-supplied numeral speller. The
/// spelled form is stripped again so the key stays a fixed point; a speller
/// answer that strips to nothing, or to digits only, is ignored.
pub fn normalize_token_with(token: &str, spell: impl Fn(&str) -> Option<String>) -> String {
    let key = comparison_key(token);
    if !is_numeral(&key) {
        return key;
    }
    match spell(&key).map(|spelled| comparison_key(&spelled)) {
        Some(spelled) if !spelled.is_empty() && !is_numeral(&spelled) => spelled,
        _ => key,
    }
}

fn comparison_key(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn is_numeral(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
