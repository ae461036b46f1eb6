/*!
 * Mock backend implementations for testing.
 *
 * `MockBackends` hands out scripted engines and tokenizers that share call
 * counters with the factory, so tests can assert on how often each engine
 * was loaded or asked to generate:
 * - `MockPrimaryBehavior` scripts the compiled engine (echo, collapse, failures)
 * - `MockFallbackBehavior` scripts the encoder-decoder fallback
 */

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::{EngineError, TokenizerError};
use crate::providers::{ModelBackends, PieceModel, PrimaryEngine, Seq2SeqModel, TextTokenizer};
use crate::translation::decoding::DecodingOptions;

/// Text a collapsed decoder would produce
pub const DEGENERATE_TEXT: &str = "la la la la la la la la la la";

/// Whitespace tokenizer with an explicit vocabulary
#[derive(Debug, Clone, Default)]
pub struct MockTokenizer {
    vocabulary: HashSet<String>,
}

impl MockTokenizer {
    pub fn with_vocab(tokens: &[&str]) -> Self {
        Self {
            vocabulary: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TextTokenizer for MockTokenizer {
    fn encode(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        Ok(line.split_whitespace().map(str::to_string).collect())
    }

    fn decode(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        Ok(tokens.join(" "))
    }

    fn contains_token(&self, token: &str) -> bool {
        self.vocabulary.contains(token)
    }
}

/// Whitespace piece model
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPieceModel;

impl PieceModel for MockPieceModel {
    fn encode_pieces(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        Ok(line.split_whitespace().map(str::to_string).collect())
    }

    fn decode_pieces(&self, pieces: &[String]) -> Result<String, TokenizerError> {
        Ok(pieces.join(" "))
    }
}

/// Behavior mode for the mock primary engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockPrimaryBehavior {
    /// Returns the source tokens upper-cased
    Uppercase,
    /// Returns a collapsed, repetitive hypothesis
    Degenerate,
    /// Loading fails
    FailLoad,
    /// Engine family not compiled in
    Unavailable,
    /// Loads, but every generation fails
    FailGeneration,
}

/// Behavior mode for the mock fallback model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockFallbackBehavior {
    /// Returns "[hf] <line>"
    Working,
    /// Degenerate at normal strictness, fine once escalated
    DegenerateUntilStrict,
    /// Degenerate at every strictness
    AlwaysDegenerate,
    /// Every generation fails
    Failing,
    /// Generation panics
    Panicking,
    /// Loading fails
    FailLoad,
}

/// Shared call counters
#[derive(Debug, Default)]
pub struct MockCounters {
    pub primary_loads: AtomicUsize,
    pub primary_calls: AtomicUsize,
    pub fallback_loads: AtomicUsize,
    pub fallback_calls: AtomicUsize,
    /// Options the primary engine was called with, in order
    pub primary_options: Mutex<Vec<DecodingOptions>>,
    /// Options the fallback model was called with, in order
    pub fallback_options: Mutex<Vec<DecodingOptions>>,
}

/// Mock compiled engine
#[derive(Debug)]
pub struct MockPrimaryEngine {
    behavior: MockPrimaryBehavior,
    counters: Arc<MockCounters>,
}

impl PrimaryEngine for MockPrimaryEngine {
    fn translate(&self, tokens: &[String], options: &DecodingOptions) -> Result<Vec<String>, EngineError> {
        self.counters.primary_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.counters.primary_options.lock() {
            seen.push(options.clone());
        }

        let mut hypothesis: Vec<String> = options.target_tag.iter().cloned().collect();
        match self.behavior {
            MockPrimaryBehavior::Uppercase => {
                hypothesis.extend(tokens.iter().map(|t| t.to_uppercase()));
            }
            MockPrimaryBehavior::Degenerate => {
                hypothesis.extend(DEGENERATE_TEXT.split(' ').map(str::to_string));
            }
            MockPrimaryBehavior::FailGeneration => {
                return Err(EngineError::Generation("scripted failure".to_string()));
            }
            MockPrimaryBehavior::FailLoad | MockPrimaryBehavior::Unavailable => {
                return Err(EngineError::EmptyOutput);
            }
        }
        Ok(hypothesis)
    }
}

/// Mock encoder-decoder fallback model
#[derive(Debug)]
pub struct MockSeq2Seq {
    behavior: MockFallbackBehavior,
    counters: Arc<MockCounters>,
}

impl Seq2SeqModel for MockSeq2Seq {
    fn generate(&mut self, line: &str, options: &DecodingOptions) -> Result<String, EngineError> {
        self.counters.fallback_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.counters.fallback_options.lock() {
            seen.push(options.clone());
        }

        // the strict policy is recognizable by its wider beam
        let strict = options.beam_size > 5;
        match self.behavior {
            MockFallbackBehavior::Working => Ok(format!("[hf] {}", line)),
            MockFallbackBehavior::DegenerateUntilStrict if strict => Ok(format!("[hf strict] {}", line)),
            MockFallbackBehavior::DegenerateUntilStrict | MockFallbackBehavior::AlwaysDegenerate => {
                Ok(DEGENERATE_TEXT.to_string())
            }
            MockFallbackBehavior::Failing => Err(EngineError::Generation("scripted failure".to_string())),
            MockFallbackBehavior::Panicking => panic!("scripted panic in fallback model"),
            MockFallbackBehavior::FailLoad => Err(EngineError::EmptyOutput),
        }
    }
}

/// Scripted backend factory
#[derive(Debug, Clone)]
pub struct MockBackends {
    pretrained: Option<MockTokenizer>,
    piece_models: bool,
    broken_piece_models: bool,
    primary: MockPrimaryBehavior,
    fallback: Option<MockFallbackBehavior>,
    counters: Arc<MockCounters>,
}

impl Default for MockBackends {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackends {
    /// Piece models supported, no pretrained tokenizer, upper-casing primary, no fallback
    pub fn new() -> Self {
        Self {
            pretrained: None,
            piece_models: true,
            broken_piece_models: false,
            primary: MockPrimaryBehavior::Uppercase,
            fallback: None,
            counters: Arc::new(MockCounters::default()),
        }
    }

    pub fn with_pretrained(mut self, tokenizer: MockTokenizer) -> Self {
        self.pretrained = Some(tokenizer);
        self
    }

    pub fn without_piece_models(mut self) -> Self {
        self.piece_models = false;
        self
    }

    pub fn with_broken_piece_models(mut self) -> Self {
        self.broken_piece_models = true;
        self
    }

    pub fn with_primary(mut self, behavior: MockPrimaryBehavior) -> Self {
        self.primary = behavior;
        self
    }

    pub fn with_fallback(mut self, behavior: MockFallbackBehavior) -> Self {
        self.fallback = Some(behavior);
        self
    }

    pub fn counters(&self) -> &MockCounters {
        &self.counters
    }

    pub fn primary_loads(&self) -> usize {
        self.counters.primary_loads.load(Ordering::SeqCst)
    }

    pub fn primary_calls(&self) -> usize {
        self.counters.primary_calls.load(Ordering::SeqCst)
    }

    pub fn fallback_loads(&self) -> usize {
        self.counters.fallback_loads.load(Ordering::SeqCst)
    }

    pub fn fallback_calls(&self) -> usize {
        self.counters.fallback_calls.load(Ordering::SeqCst)
    }
}

impl ModelBackends for MockBackends {
    fn load_pretrained_tokenizer(&self, _dir: &Path) -> Option<Box<dyn TextTokenizer>> {
        self.pretrained
            .clone()
            .map(|t| Box::new(t) as Box<dyn TextTokenizer>)
    }

    fn supports_piece_models(&self) -> bool {
        self.piece_models
    }

    fn load_piece_model(&self, path: &Path) -> Result<Box<dyn PieceModel>, TokenizerError> {
        if !self.piece_models {
            return Err(TokenizerError::Unavailable("mock without piece models".to_string()));
        }
        if self.broken_piece_models {
            return Err(TokenizerError::LoadFailed {
                path: path.display().to_string(),
                message: "scripted corrupt model".to_string(),
            });
        }
        Ok(Box::new(MockPieceModel))
    }

    fn load_primary(&self, location: &Path) -> Result<Box<dyn PrimaryEngine>, EngineError> {
        self.counters.primary_loads.fetch_add(1, Ordering::SeqCst);
        match self.primary {
            MockPrimaryBehavior::FailLoad => Err(EngineError::LoadFailed {
                path: location.display().to_string(),
                message: "scripted load failure".to_string(),
            }),
            MockPrimaryBehavior::Unavailable => Err(EngineError::Unavailable("mock engine".to_string())),
            behavior => Ok(Box::new(MockPrimaryEngine {
                behavior,
                counters: Arc::clone(&self.counters),
            })),
        }
    }

    fn has_fallback(&self, _dir: &Path) -> bool {
        self.fallback.is_some()
    }

    fn load_fallback(&self, dir: &Path) -> Result<Box<dyn Seq2SeqModel>, EngineError> {
        self.counters.fallback_loads.fetch_add(1, Ordering::SeqCst);
        match self.fallback {
            None => Err(EngineError::Unavailable("no mock fallback".to_string())),
            Some(MockFallbackBehavior::FailLoad) => Err(EngineError::LoadFailed {
                path: dir.display().to_string(),
                message: "scripted load failure".to_string(),
            }),
            Some(behavior) => Ok(Box::new(MockSeq2Seq {
                behavior,
                counters: Arc::clone(&self.counters),
            })),
        }
    }
}
