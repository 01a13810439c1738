use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{SequenceMatcherProvider, StandardNormalizer};
use crate::pipeline::runtime::{TranscriptAligner, TranscriptAlignerParts};
use crate::pipeline::traits::{EditScriptProvider, WordNormalizer};

pub struct TranscriptAlignerBuilder {
    config: AlignerConfig,
    normalizer: Option<Box<dyn WordNormalizer>>,
    edit_script_provider: Option<Box<dyn EditScriptProvider>>,
}

impl TranscriptAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            normalizer: None,
            edit_script_provider: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn WordNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Replaces the default sequence matcher. `autojunk` in the config only
    /// applies to the default provider.
    pub fn with_edit_script_provider(mut self, provider: Box<dyn EditScriptProvider>) -> Self {
        self.edit_script_provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<TranscriptAligner, AlignmentError> {
        let autojunk = self.config.autojunk;
        tracing::debug!(
            autojunk,
            gap_closing = ?self.config.gap_closing,
            custom_normalizer = self.normalizer.is_some(),
            custom_provider = self.edit_script_provider.is_some(),
            "building transcript aligner"
        );

        Ok(TranscriptAligner::from_parts(TranscriptAlignerParts {
            gap_closing: self.config.gap_closing,
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(StandardNormalizer::default())),
            edit_script_provider: self
                .edit_script_provider
                .unwrap_or_else(|| Box::new(SequenceMatcherProvider::new(autojunk))),
        }))
    }
}

impl Default for TranscriptAlignerBuilder {
    fn default() -> Self {
        Self::new(AlignerConfig::default())
    }
}
