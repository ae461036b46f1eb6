/*!
 * # ct2-translator - machine translation shim
 *
 * A Rust library that translates text between a fixed set of language pairs
 * by orchestrating a compiled CTranslate2 engine and a local Marian fallback
 * model.
 *
 * ## Features
 *
 * - Tokenizer selection: pretrained `tokenizer.json` or SentencePiece models
 *   (separate source/target pair, or one shared model)
 * - Line-by-line translation that preserves blank lines
 * - Degeneracy detection over word diversity
 * - Fallback engine with one escalated retry per line
 * - One JSON result record per invocation, successful or not
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration resolved from the environment
 * - `language_utils`: ISO language code utilities and supported pairs
 * - `errors`: Error types and the reason-code taxonomy
 * - `providers`: Backend capability traits and implementations:
 *   - `providers::native`: Real backends (feature-gated inference libraries)
 *   - `providers::mock`: Scripted backends for tests
 * - `translation`: The translation pipeline:
 *   - `translation::pipeline`: Orchestrating state machine
 *   - `translation::primary` / `translation::fallback`: Engine adapters
 *   - `translation::quality`: Degeneracy detector
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{EngineError, ErrorKind, TokenizerError};
pub use language_utils::{normalize_to_part1_or_part2t, LanguagePair};
pub use translation::{translate_text, Provider, TranslationPipeline, TranslationResult};
