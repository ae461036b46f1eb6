/*!
 * Backend capabilities for the translation pipeline.
 *
 * The pipeline never talks to an inference library directly. It goes through
 * the capability traits below, and obtains implementations from a
 * `ModelBackends` factory:
 * - `native`: real backends; each engine family is gated behind a cargo
 *   feature and reports itself unavailable when not compiled in
 * - `mock`: scripted, call-counting backends for tests
 */

use std::path::Path;

use crate::errors::{EngineError, TokenizerError};
use crate::translation::decoding::DecodingOptions;

/// Uniform encode/decode contract over every tokenizer strategy
pub trait TextTokenizer {
    /// Split one line into token strings
    fn encode(&self, line: &str) -> Result<Vec<String>, TokenizerError>;

    /// Join token strings back into text
    fn decode(&self, tokens: &[String]) -> Result<String, TokenizerError>;

    /// Whether the token is part of the vocabulary the engine was trained with
    fn contains_token(&self, token: &str) -> bool;
}

/// A single subword-piece model
pub trait PieceModel {
    fn encode_pieces(&self, line: &str) -> Result<Vec<String>, TokenizerError>;
    fn decode_pieces(&self, pieces: &[String]) -> Result<String, TokenizerError>;
}

/// A compiled translation engine consuming token sequences
pub trait PrimaryEngine {
    /// Translate one tokenized line and return the top-ranked hypothesis
    ///
    /// When `options.target_tag` is set it is forced as the decoding prefix.
    fn translate(&self, tokens: &[String], options: &DecodingOptions) -> Result<Vec<String>, EngineError>;
}

/// A full encoder-decoder model that owns its tokenization
pub trait Seq2SeqModel {
    /// Generate a translation of one raw line
    fn generate(&mut self, line: &str, options: &DecodingOptions) -> Result<String, EngineError>;
}

/// Factory for every backend the pipeline may assemble
pub trait ModelBackends {
    /// Pretrained-vocabulary tokenizer from a local model directory, if resolvable
    fn load_pretrained_tokenizer(&self, dir: &Path) -> Option<Box<dyn TextTokenizer>>;

    /// Whether subword-piece models can be loaded by this build
    fn supports_piece_models(&self) -> bool;

    /// Load one subword-piece model file
    fn load_piece_model(&self, path: &Path) -> Result<Box<dyn PieceModel>, TokenizerError>;

    /// Load the compiled primary engine from its model location
    fn load_primary(&self, location: &Path) -> Result<Box<dyn PrimaryEngine>, EngineError>;

    /// Whether a usable fallback model directory is present
    fn has_fallback(&self, dir: &Path) -> bool;

    /// Load the fallback model from its directory
    fn load_fallback(&self, dir: &Path) -> Result<Box<dyn Seq2SeqModel>, EngineError>;
}

pub mod mock;
pub mod native;
pub mod pretrained;
pub mod vocab;

#[cfg(feature = "ct2")]
pub mod ctranslate2;
#[cfg(feature = "hf")]
pub mod marian;
#[cfg(feature = "spm")]
pub mod spm;
