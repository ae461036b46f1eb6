/*!
 * SentencePiece subword models.
 */

use std::path::Path;

use sentencepiece::SentencePieceProcessor;

use crate::errors::TokenizerError;
use crate::providers::PieceModel;

/// One loaded `.spm` / `.model` file
pub struct SentencePieceModel {
    processor: SentencePieceProcessor,
}

impl SentencePieceModel {
    pub fn open(path: &Path) -> Result<Self, TokenizerError> {
        SentencePieceProcessor::open(path)
            .map(|processor| Self { processor })
            .map_err(|e| TokenizerError::LoadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}

impl PieceModel for SentencePieceModel {
    fn encode_pieces(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        let pieces = self
            .processor
            .encode(line)
            .map_err(|e| TokenizerError::Encode(e.to_string()))?;
        Ok(pieces.into_iter().map(|p| p.piece).collect())
    }

    fn decode_pieces(&self, pieces: &[String]) -> Result<String, TokenizerError> {
        self.processor
            .decode_pieces(pieces)
            .map_err(|e| TokenizerError::Decode(e.to_string()))
    }
}
