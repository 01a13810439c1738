pub mod classify;
pub mod interpolate;
pub mod normalize;
pub mod number_words;
pub mod opcodes;
pub mod report;
pub mod reproject;
pub mod sequence_matcher;
pub mod tokenization;
