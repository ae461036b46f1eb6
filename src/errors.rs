/*!
 * Error types for the ct2-translator pipeline.
 *
 * Adapter-level failures are modeled with thiserror enums. The orchestrator
 * folds them into the closed `ErrorKind` taxonomy that ends up in the output
 * record; nothing here is ever allowed to reach the process boundary.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason codes reported on the error path of a result record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Language pair is not in the supported set
    UnsupportedDirection,
    /// Primary engine selected but no model location configured
    ModelPathMissing,
    /// Primary model location configured but the engine failed to initialize
    ModelLoadFailed,
    /// Subword-piece model files absent
    SpmMissing,
    /// Subword-piece model files present but unreadable
    SpmLoadFailed,
    /// No usable backend could be assembled
    DepsMissing,
    /// Generation failed with no fallback to absorb it
    TranslateFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedDirection => "unsupported_direction",
            Self::ModelPathMissing => "model_path_missing",
            Self::ModelLoadFailed => "model_load_failed",
            Self::SpmMissing => "spm_missing",
            Self::SpmLoadFailed => "spm_load_failed",
            Self::DepsMissing => "deps_missing",
            Self::TranslateFailed => "translate_failed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by translation engines (primary or fallback)
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine family is not compiled into this build
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Model artifacts could not be loaded
    #[error("Failed to load model from {path}: {message}")]
    LoadFailed {
        /// Model location that was attempted
        path: String,
        /// Underlying loader message
        message: String,
    },

    /// Generation failed after the model was loaded
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The engine returned no usable hypothesis
    #[error("Engine returned no hypothesis")]
    EmptyOutput,

    /// Tokenization failed inside the engine boundary
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

/// Errors raised by tokenizer strategies
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The tokenizer strategy is not compiled into this build
    #[error("Tokenizer unavailable: {0}")]
    Unavailable(String),

    /// No model file was found for the strategy
    #[error("Tokenizer model missing in {0}")]
    Missing(String),

    /// The model file exists but failed to load
    #[error("Failed to load tokenizer {path}: {message}")]
    LoadFailed {
        /// File that was attempted
        path: String,
        /// Underlying loader message
        message: String,
    },

    /// Encoding a line failed
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Decoding tokens failed
    #[error("Decode failed: {0}")]
    Decode(String),
}

impl TokenizerError {
    /// Reason code reported when this error ends tokenizer selection
    pub fn reason(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::DepsMissing,
            Self::Missing(_) => ErrorKind::SpmMissing,
            Self::LoadFailed { .. } | Self::Encode(_) | Self::Decode(_) => ErrorKind::SpmLoadFailed,
        }
    }
}
