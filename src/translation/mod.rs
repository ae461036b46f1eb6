/*!
 * Translation pipeline for the ct2-translator shim.
 *
 * The pipeline picks a backend for a language pair, translates line by line,
 * checks the output for collapse and escalates to the fallback engine when
 * needed. It is split into several submodules:
 *
 * - `quality`: Degeneracy detection over word diversity
 * - `decoding`: Generation parameters for both engines
 * - `tokenizer`: Tokenizer strategy selection for the primary engine
 * - `generation`: Beam search used by the fallback engine
 * - `primary`: Compiled-engine adapter
 * - `fallback`: Encoder-decoder adapter with one-step escalation
 * - `pipeline`: The orchestrating state machine
 * - `result`: The output record
 */

// Re-export main types for easier usage
pub use self::decoding::{DecodingOptions, DecodingPolicy, EscalationLevel};
pub use self::fallback::FallbackTranslator;
pub use self::pipeline::{translate_text, TranslationPipeline};
pub use self::primary::PrimaryTranslator;
pub use self::quality::{is_degenerate, QualityDetector};
pub use self::result::{Provider, TranslationResult};
pub use self::tokenizer::{select_tokenizer, TokenizerHandle, TokenizerMode};

// Submodules
pub mod decoding;
pub mod fallback;
pub mod generation;
pub mod pipeline;
pub mod primary;
pub mod quality;
pub mod result;
pub mod tokenizer;
