/*!
 * Primary engine adapter.
 *
 * Translates strictly line by line so the document keeps its layout:
 * whitespace-only lines are copied through without touching the engine,
 * every other line is tokenized, decoded under the primary policy and
 * detokenized with the same tokenizer that produced its tokens.
 */

use log::debug;

use crate::errors::EngineError;
use crate::providers::PrimaryEngine;
use crate::translation::decoding::{DecodingPolicy, EscalationLevel};
use crate::translation::tokenizer::{TokenizerHandle, TokenizerMode};

/// Compiled engine paired with the tokenizer strategy that feeds it
pub struct PrimaryTranslator {
    engine: Box<dyn PrimaryEngine>,
    tokenizer: TokenizerHandle,
    target_tag: Option<String>,
}

impl PrimaryTranslator {
    /// `tag` is used only when the active tokenizer's vocabulary knows it
    pub fn new(engine: Box<dyn PrimaryEngine>, tokenizer: TokenizerHandle, tag: &str) -> Self {
        let target_tag = tokenizer.resolve_target_tag(tag);
        Self {
            engine,
            tokenizer,
            target_tag,
        }
    }

    pub fn tokenizer_mode(&self) -> TokenizerMode {
        self.tokenizer.mode()
    }

    pub fn target_tag(&self) -> Option<&str> {
        self.target_tag.as_deref()
    }

    /// Translate a whole document
    pub fn translate(&self, text: &str) -> Result<String, EngineError> {
        let lines = text
            .split('\n')
            .map(|line| self.translate_line(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Translate one line; blank lines pass through unchanged
    pub fn translate_line(&self, line: &str) -> Result<String, EngineError> {
        if line.trim().is_empty() {
            return Ok(line.to_string());
        }

        let tokens = self.tokenizer.tokenize(line)?;
        let options = DecodingPolicy::Primary
            .options_for(tokens.len(), EscalationLevel::Normal)
            .with_target_tag(self.target_tag.clone());
        debug!(
            "Primary decode: {} tokens, max_length={}, tag={:?}",
            tokens.len(),
            options.max_length,
            options.target_tag
        );

        let mut hypothesis = self.engine.translate(&tokens, &options)?;
        // a forced prefix comes back as the first hypothesis token
        if let Some(tag) = &self.target_tag {
            if hypothesis.first() == Some(tag) {
                hypothesis.remove(0);
            }
        }
        Ok(self.tokenizer.detokenize(&hypothesis)?)
    }
}
