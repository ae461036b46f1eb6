/*!
 * Pretrained-vocabulary tokenizer backed by a `tokenizer.json` file.
 */

use std::path::Path;

use log::debug;
use tokenizers::Tokenizer;

use crate::errors::TokenizerError;
use crate::providers::TextTokenizer;

/// File name of a serialized pretrained tokenizer inside a model directory
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Tokenizer whose vocabulary ships with the pretrained model
pub struct PretrainedTokenizer {
    inner: Tokenizer,
}

impl PretrainedTokenizer {
    /// Load `tokenizer.json` from a model directory
    pub fn from_dir(dir: &Path) -> Result<Self, TokenizerError> {
        let path = dir.join(TOKENIZER_FILE);
        if !path.is_file() {
            return Err(TokenizerError::Missing(dir.display().to_string()));
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        Tokenizer::from_file(path)
            .map(|inner| Self { inner })
            .map_err(|e| TokenizerError::LoadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}

impl TextTokenizer for PretrainedTokenizer {
    fn encode(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        let encoding = self
            .inner
            .encode(line, false)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn decode(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        let mut ids = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.inner.token_to_id(token) {
                Some(id) => ids.push(id),
                None => debug!("Dropping out-of-vocabulary token {:?}", token),
            }
        }
        self.inner
            .decode(&ids, true)
            .map_err(|e| TokenizerError::Decode(e.to_string()))
    }

    fn contains_token(&self, token: &str) -> bool {
        self.inner.token_to_id(token).is_some()
    }
}
