/*!
 * Tokenizer adapter for the primary engine.
 *
 * Exactly one strategy is active per invocation:
 * - a pretrained-vocabulary tokenizer found in the local model directory
 *   (`tokenizer.json`, or its piece models plus `vocab.json`), or
 * - subword-piece models inside the primary model location, either a
 *   separate source/target pair or one shared model.
 *
 * Both strategies sit behind `TextTokenizer`, so the engine adapter never
 * needs to know which one it got.
 */

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;

use crate::errors::TokenizerError;
use crate::providers::vocab::PieceTokenizer;
use crate::providers::{ModelBackends, PieceModel, TextTokenizer};

pub const SOURCE_SPM_FILE: &str = "source.spm";
pub const TARGET_SPM_FILE: &str = "target.spm";
pub const SHARED_SPM_FILE: &str = "spm.model";
/// Vocabulary written next to a converted engine model
pub const SIDECAR_VOCAB_FILE: &str = "shared_vocabulary.json";

/// Which tokenizer strategy is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerMode {
    /// Pretrained-vocabulary tokenizer, no subword-piece models
    Pretrained,
    /// Separate source and target piece models
    Separate,
    /// One piece model shared by both sides
    Shared,
}

impl TokenizerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretrained => "pretrained",
            Self::Separate => "separate",
            Self::Shared => "shared",
        }
    }
}

impl std::fmt::Display for TokenizerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subword-piece strategy: encode with the source model, decode with the target model
pub struct SubwordTokenizer {
    source: Box<dyn PieceModel>,
    target: Box<dyn PieceModel>,
    vocabulary: HashSet<String>,
}

impl SubwordTokenizer {
    pub fn new(source: Box<dyn PieceModel>, target: Box<dyn PieceModel>, vocabulary: HashSet<String>) -> Self {
        Self {
            source,
            target,
            vocabulary,
        }
    }
}

impl TextTokenizer for SubwordTokenizer {
    fn encode(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        self.source.encode_pieces(line)
    }

    fn decode(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        self.target.decode_pieces(tokens)
    }

    fn contains_token(&self, token: &str) -> bool {
        self.vocabulary.contains(token)
    }
}

/// Read the engine's side-channel vocabulary file
///
/// Accepts either a JSON list of tokens or a token-keyed object. Any read or
/// parse failure yields an empty vocabulary.
pub fn load_sidecar_vocabulary(location: &Path) -> HashSet<String> {
    let path = location.join(SIDECAR_VOCAB_FILE);
    let parsed = std::fs::read_to_string(&path)
        .ok()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok());
    match parsed {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        Some(serde_json::Value::Object(map)) => map.into_iter().map(|(token, _)| token).collect(),
        _ => {
            debug!("No usable vocabulary at {}", path.display());
            HashSet::new()
        }
    }
}

/// The active tokenizer together with its strategy
pub struct TokenizerHandle {
    tokenizer: Box<dyn TextTokenizer>,
    mode: TokenizerMode,
}

impl std::fmt::Debug for TokenizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerHandle").field("mode", &self.mode).finish()
    }
}

impl TokenizerHandle {
    pub fn new(tokenizer: Box<dyn TextTokenizer>, mode: TokenizerMode) -> Self {
        Self { tokenizer, mode }
    }

    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }

    pub fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        self.tokenizer.encode(line)
    }

    pub fn detokenize(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        self.tokenizer.decode(tokens)
    }

    /// The tag, if the active vocabulary knows it
    pub fn resolve_target_tag(&self, tag: &str) -> Option<String> {
        if self.tokenizer.contains_token(tag) {
            Some(tag.to_string())
        } else {
            debug!("Target tag {} not in vocabulary; decoding untagged", tag);
            None
        }
    }
}

/// Pick the tokenizer strategy for the primary engine
///
/// The pretrained strategy comes from the local model directory: its
/// `tokenizer.json` if present, otherwise its piece models with `vocab.json`.
/// Only then are the piece models inside the primary model location probed.
pub fn select_tokenizer(
    backends: &dyn ModelBackends,
    pretrained_dir: &Path,
    model_location: &Path,
) -> Result<TokenizerHandle, TokenizerError> {
    if let Some(tokenizer) = backends.load_pretrained_tokenizer(pretrained_dir) {
        info!("Using pretrained tokenizer from {}", pretrained_dir.display());
        return Ok(TokenizerHandle::new(tokenizer, TokenizerMode::Pretrained));
    }

    match PieceTokenizer::from_dir(pretrained_dir, |path| backends.load_piece_model(path)) {
        Ok(tokenizer) => {
            info!("Using pretrained piece vocabulary from {}", pretrained_dir.display());
            return Ok(TokenizerHandle::new(Box::new(tokenizer), TokenizerMode::Pretrained));
        }
        Err(e) => debug!("No pretrained piece vocabulary: {}", e),
    }

    if !backends.supports_piece_models() {
        return Err(TokenizerError::Unavailable(
            "subword-piece models are not supported by this build".to_string(),
        ));
    }

    let source_path = model_location.join(SOURCE_SPM_FILE);
    let target_path = model_location.join(TARGET_SPM_FILE);
    let shared_path = model_location.join(SHARED_SPM_FILE);

    let (source, target, mode) = if source_path.is_file() && target_path.is_file() {
        (
            backends.load_piece_model(&source_path)?,
            backends.load_piece_model(&target_path)?,
            TokenizerMode::Separate,
        )
    } else if shared_path.is_file() {
        (
            backends.load_piece_model(&shared_path)?,
            backends.load_piece_model(&shared_path)?,
            TokenizerMode::Shared,
        )
    } else {
        return Err(TokenizerError::Missing(model_location.display().to_string()));
    };

    info!("Using {} subword-piece models from {}", mode, model_location.display());
    let vocabulary = load_sidecar_vocabulary(model_location);
    Ok(TokenizerHandle::new(
        Box::new(SubwordTokenizer::new(source, target, vocabulary)),
        mode,
    ))
}
