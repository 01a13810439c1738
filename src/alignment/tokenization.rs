/// Collapses line breaks the way reference transcripts are laid out: a
/// blank-line paragraph break (`"\n\n"`) is removed outright and any other
/// newline becomes a space. CRLF counts as LF.
pub fn collapse_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n")
        .trim()
        .replace("\n\n", "")
        .replace('\n', " ")
}

/// Splits reference text into tokens. Punctuation stays attached; it only
/// disappears from the comparison keys.
pub fn reference_tokens(text: &str) -> Vec<String> {
    collapse_line_breaks(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(reference_tokens("").is_empty());
        assert!(reference_tokens(" \n\n \n").is_empty());
    }

    #[test]
    fn punctuation_stays_attached() {
        assert_eq!(
            reference_tokens("There was a day, about 10 years ago."),
            ["There", "was", "a", "day,", "about", "10", "years", "ago."]
        );
    }

    #[test]
    fn single_newline_becomes_space() {
        assert_eq!(reference_tokens("one\ntwo"), ["one", "two"]);
    }

    #[test]
    fn paragraph_break_is_deleted() {
        assert_eq!(reference_tokens("end.\n\nNext"), ["end.Next"]);
        assert_eq!(reference_tokens("end. \n\n Next"), ["end.", "Next"]);
    }

    #[test]
    fn crlf_is_treated_as_lf() {
        assert_eq!(reference_tokens("one\r\ntwo"), ["one", "two"]);
        assert_eq!(reference_tokens("a \r\n\r\n b"), ["a", "b"]);
    }

    #[test]
    fn repeated_spaces_do_not_create_empty_tokens() {
        assert_eq!(reference_tokens("  a   b  "), ["a", "b"]);
    }

    #[test]
    fn trailing_space_is_ignored() {
        let text = "down. ";
        assert_eq!(reference_tokens(text), ["down."]);
    }
}
