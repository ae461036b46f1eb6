/*!
 * Native backends.
 *
 * The pretrained-vocabulary tokenizer is always compiled in. Each inference
 * family is behind its own cargo feature:
 * - `ct2`: CTranslate2 primary engine
 * - `spm`: SentencePiece subword models
 * - `hf`: local Marian fallback model (implies `spm`)
 *
 * A family that is not compiled in reports itself unavailable, which the
 * pipeline treats exactly like a missing optional dependency.
 */

use std::path::Path;

use log::debug;

use crate::errors::{EngineError, TokenizerError};
use crate::providers::pretrained::PretrainedTokenizer;
use crate::providers::{ModelBackends, PieceModel, PrimaryEngine, Seq2SeqModel, TextTokenizer};

/// Backends backed by the real inference libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackends;

impl NativeBackends {
    pub fn new() -> Self {
        Self
    }

    /// Names of the engine families compiled into this build
    pub fn compiled_features() -> Vec<&'static str> {
        let mut features = Vec::new();
        if cfg!(feature = "ct2") {
            features.push("ct2");
        }
        if cfg!(feature = "spm") {
            features.push("spm");
        }
        if cfg!(feature = "hf") {
            features.push("hf");
        }
        features
    }
}

impl ModelBackends for NativeBackends {
    fn load_pretrained_tokenizer(&self, dir: &Path) -> Option<Box<dyn TextTokenizer>> {
        match PretrainedTokenizer::from_dir(dir) {
            Ok(tokenizer) => Some(Box::new(tokenizer)),
            Err(e) => {
                debug!("No pretrained tokenizer: {}", e);
                None
            }
        }
    }

    fn supports_piece_models(&self) -> bool {
        cfg!(feature = "spm")
    }

    #[cfg(feature = "spm")]
    fn load_piece_model(&self, path: &Path) -> Result<Box<dyn PieceModel>, TokenizerError> {
        Ok(Box::new(crate::providers::spm::SentencePieceModel::open(path)?))
    }

    #[cfg(not(feature = "spm"))]
    fn load_piece_model(&self, path: &Path) -> Result<Box<dyn PieceModel>, TokenizerError> {
        Err(TokenizerError::Unavailable(format!(
            "built without `spm` support, cannot load {}",
            path.display()
        )))
    }

    #[cfg(feature = "ct2")]
    fn load_primary(&self, location: &Path) -> Result<Box<dyn PrimaryEngine>, EngineError> {
        Ok(Box::new(crate::providers::ctranslate2::Ct2Engine::load(location)?))
    }

    #[cfg(not(feature = "ct2"))]
    fn load_primary(&self, location: &Path) -> Result<Box<dyn PrimaryEngine>, EngineError> {
        Err(EngineError::Unavailable(format!(
            "built without `ct2` support, cannot load {}",
            location.display()
        )))
    }

    fn has_fallback(&self, dir: &Path) -> bool {
        cfg!(feature = "hf") && dir.is_dir()
    }

    #[cfg(feature = "hf")]
    fn load_fallback(&self, dir: &Path) -> Result<Box<dyn Seq2SeqModel>, EngineError> {
        Ok(Box::new(crate::providers::marian::MarianModel::load(dir)?))
    }

    #[cfg(not(feature = "hf"))]
    fn load_fallback(&self, dir: &Path) -> Result<Box<dyn Seq2SeqModel>, EngineError> {
        Err(EngineError::Unavailable(format!(
            "built without `hf` support, cannot load {}",
            dir.display()
        )))
    }
}
