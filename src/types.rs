use std::fmt;
use std::io::Read;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::alignment::report::TimingReport;
use crate::error::AlignmentError;

/// One recognised word from the speech-to-text engine. Times are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SttWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl SttWord {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }
}

/// STT engine output in its `{ "words": [...] }` envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SttTranscript {
    pub words: Vec<SttWord>,
}

#[derive(Debug, Deserialize)]
struct RawSttTranscript {
    #[serde(default)]
    words: Vec<RawSttWord>,
}

#[derive(Debug, Deserialize)]
struct RawSttWord {
    word: Option<String>,
    start: Option<f64>,
    end: Option<f64>,
}

impl SttTranscript {
    pub fn new(words: Vec<SttWord>) -> Self {
        Self { words }
    }

    pub fn from_json_str(data: &str) -> Result<Self, AlignmentError> {
        let raw: RawSttTranscript =
            serde_json::from_str(data).map_err(|e| AlignmentError::json("parse STT words", e))?;
        Self::from_raw(raw)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, AlignmentError> {
        let raw: RawSttTranscript = serde_json::from_reader(reader)
            .map_err(|e| AlignmentError::json("parse STT words", e))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSttTranscript) -> Result<Self, AlignmentError> {
        let mut words = Vec::with_capacity(raw.words.len());
        for (idx, record) in raw.words.into_iter().enumerate() {
            let word = record.word.ok_or_else(|| {
                AlignmentError::invalid_input(format!("STT word #{idx} is missing `word`"))
            })?;
            let start = required_time(record.start, idx, "start")?;
            let end = required_time(record.end, idx, "end")?;
            if start > end {
                tracing::warn!(
                    index = idx,
                    word = word.as_str(),
                    start,
                    end,
                    "STT word ends before it starts"
                );
            }
            words.push(SttWord { word, start, end });
        }
        Ok(Self { words })
    }
}

fn required_time(value: Option<f64>, idx: usize, field: &str) -> Result<f64, AlignmentError> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(AlignmentError::invalid_input(format!(
            "STT word #{idx} has non-finite `{field}`: {v}"
        ))),
        None => Err(AlignmentError::invalid_input(format!(
            "STT word #{idx} is missing `{field}`"
        ))),
    }
}

/// Per-reference-word record before interpolation. `start`/`end` are only
/// set where an `equal` opcode carried STT timing over.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordSlot {
    pub word: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl WordSlot {
    pub fn has_timing(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedWord {
    pub start: f64,
    pub end: f64,
    pub word: String,
}

/// Reference text (byte-identical to the input) with one timed entry per
/// reference token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTranscript {
    pub text: String,
    pub words: Vec<AlignedWord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentOutput {
    pub transcript: AlignedTranscript,
    pub report: TimingReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingSide {
    Start,
    End,
}

impl fmt::Display for TimingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

/// Operation tag in the edit-script provider's own vocabulary: `Insert`
/// means reference-only tokens, `Delete` means STT-only tokens.
/// Variant order indexes the classifier's reporting table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl EditTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// Category reported to consumers, relative to the reference text:
/// `Insert` is a word the STT added, `Delete` a word the STT dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// Half-open ranges into the STT (`stt`) and reference (`reference`) token
/// sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub tag: EditTag,
    pub stt: Range<usize>,
    pub reference: Range<usize>,
}

impl Opcode {
    pub fn new(tag: EditTag, stt: Range<usize>, reference: Range<usize>) -> Self {
        Self {
            tag,
            stt,
            reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSegment {
    pub match_type: MatchType,
    #[serde(with = "na_marker")]
    pub stt: Option<Vec<SttWord>>,
    #[serde(with = "na_marker")]
    pub base_text: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffCounts {
    pub equal: usize,
    pub insert: usize,
    pub delete: usize,
    pub replace: usize,
    pub base_text_total_word_count: usize,
}

impl DiffCounts {
    /// Word error rate against the reference: every non-equal word over the
    /// reference word count.
    pub fn word_error_rate(&self) -> f64 {
        if self.base_text_total_word_count == 0 {
            return 0.0;
        }
        (self.insert + self.delete + self.replace) as f64 / self.base_text_total_word_count as f64
    }
}

/// Absent diff sides travel as the string `"NA"`.
mod na_marker {
    use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
    use serde::ser::{Serialize, Serializer};

    const MARKER: &str = "NA";

    pub fn serialize<S, T>(value: &Option<Vec<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(items) => items.serialize(serializer),
            None => serializer.serialize_str(MARKER),
        }
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ListOrMarker<T> {
        List(Vec<T>),
        Marker(String),
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match ListOrMarker::<T>::deserialize(deserializer)? {
            ListOrMarker::List(items) => Ok(Some(items)),
            ListOrMarker::Marker(marker) if marker == MARKER => Ok(None),
            ListOrMarker::Marker(other) => Err(de::Error::custom(format!(
                "expected a list or \"{MARKER}\", got \"{other}\""
            ))),
        }
    }
}
