use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Neighbour gap-closing pass run before interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapClosing {
    /// Snap each timed word's start to its timed predecessor's end and its
    /// end to its timed successor's start. The first start and the last end
    /// are never moved.
    #[default]
    Neighbours,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Ignore very frequent reference tokens when seeding matches on long
    /// transcripts (difflib's autojunk heuristic).
    pub autojunk: bool,
    pub gap_closing: GapClosing,
}

impl AlignerConfig {
    /// Reference length from which autojunk applies.
    pub const AUTOJUNK_MIN_LEN: usize = 200;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse aligner config", e))
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            autojunk: true,
            gap_closing: GapClosing::Neighbours,
        }
    }
}
