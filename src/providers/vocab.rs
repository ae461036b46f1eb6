/*!
 * Piece/id vocabulary of an encoder-decoder model.
 *
 * Marian-style model directories tokenize with SentencePiece and then map
 * pieces to model ids through `vocab.json`. `PieceTokenizer` combines the
 * two so that the fallback model can go from a raw line to ids and back.
 * The same directory also serves the primary engine as a pretrained
 * vocabulary tokenizer when it carries no `tokenizer.json`.
 */

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::errors::TokenizerError;
use crate::providers::{PieceModel, TextTokenizer};
use crate::translation::tokenizer::{SOURCE_SPM_FILE, TARGET_SPM_FILE};

/// File name of the piece-to-id map inside a model directory
pub const VOCAB_FILE: &str = "vocab.json";

pub const UNK_PIECE: &str = "<unk>";
pub const EOS_PIECE: &str = "</s>";
pub const PAD_PIECE: &str = "<pad>";

/// Bidirectional piece/id map
#[derive(Debug, Clone)]
pub struct PieceVocab {
    piece_to_id: HashMap<String, u32>,
    id_to_piece: HashMap<u32, String>,
    unk_id: u32,
    special_ids: HashSet<u32>,
}

impl PieceVocab {
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let load_err = |message: String| TokenizerError::LoadFailed {
            path: path.display().to_string(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let map: HashMap<String, u32> = serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;
        Self::from_map(map).map_err(|e| load_err(e.to_string()))
    }

    pub fn from_map(piece_to_id: HashMap<String, u32>) -> Result<Self, TokenizerError> {
        let unk_id = *piece_to_id
            .get(UNK_PIECE)
            .ok_or_else(|| TokenizerError::Missing(format!("{} entry in vocabulary", UNK_PIECE)))?;
        let special_ids = [UNK_PIECE, EOS_PIECE, PAD_PIECE]
            .iter()
            .filter_map(|piece| piece_to_id.get(*piece).copied())
            .collect();
        let id_to_piece = piece_to_id.iter().map(|(piece, id)| (*id, piece.clone())).collect();
        Ok(Self {
            piece_to_id,
            id_to_piece,
            unk_id,
            special_ids,
        })
    }

    pub fn id_of(&self, piece: &str) -> Option<u32> {
        self.piece_to_id.get(piece).copied()
    }

    pub fn is_special(&self, id: u32) -> bool {
        self.special_ids.contains(&id)
    }

    /// Map pieces to ids; unknown pieces map to the `<unk>` id
    pub fn pieces_to_ids(&self, pieces: &[String]) -> Vec<u32> {
        pieces
            .iter()
            .map(|piece| self.id_of(piece).unwrap_or(self.unk_id))
            .collect()
    }

    /// Map ids back to pieces, skipping special tokens and unknown ids
    pub fn ids_to_pieces(&self, ids: &[u32]) -> Vec<String> {
        ids.iter()
            .filter(|id| !self.is_special(**id))
            .filter_map(|id| self.id_to_piece.get(id).cloned())
            .collect()
    }
}

/// Raw line <-> model ids through source/target piece models and a shared vocabulary
pub struct PieceTokenizer {
    source: Box<dyn PieceModel>,
    target: Box<dyn PieceModel>,
    vocab: PieceVocab,
}

impl PieceTokenizer {
    pub fn new(source: Box<dyn PieceModel>, target: Box<dyn PieceModel>, vocab: PieceVocab) -> Self {
        Self { source, target, vocab }
    }

    /// Load `source.spm`, `target.spm` and `vocab.json` from a model directory
    ///
    /// `open_piece_model` decides how piece models are loaded, so builds
    /// without SentencePiece support fail here instead of at link time.
    pub fn from_dir(
        dir: &Path,
        open_piece_model: impl Fn(&Path) -> Result<Box<dyn PieceModel>, TokenizerError>,
    ) -> Result<Self, TokenizerError> {
        let source_path = dir.join(SOURCE_SPM_FILE);
        let target_path = dir.join(TARGET_SPM_FILE);
        let vocab_path = dir.join(VOCAB_FILE);
        if let Some(absent) = [&source_path, &target_path, &vocab_path].into_iter().find(|p| !p.is_file()) {
            return Err(TokenizerError::Missing(absent.display().to_string()));
        }

        let source = open_piece_model(&source_path)?;
        let target = open_piece_model(&target_path)?;
        let vocab = PieceVocab::from_file(&vocab_path)?;
        Ok(Self::new(source, target, vocab))
    }

    /// Encode a line into model ids, terminated by the end-of-sequence id
    pub fn encode_ids(&self, line: &str, eos_id: u32) -> Result<Vec<u32>, TokenizerError> {
        let pieces = self.source.encode_pieces(line)?;
        let mut ids = self.vocab.pieces_to_ids(&pieces);
        ids.push(eos_id);
        Ok(ids)
    }

    /// Decode model ids into text, dropping special tokens
    pub fn decode_ids(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        let pieces = self.vocab.ids_to_pieces(ids);
        self.target.decode_pieces(&pieces)
    }
}

impl TextTokenizer for PieceTokenizer {
    fn encode(&self, line: &str) -> Result<Vec<String>, TokenizerError> {
        self.source.encode_pieces(line)
    }

    fn decode(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        self.target.decode_pieces(tokens)
    }

    fn contains_token(&self, token: &str) -> bool {
        self.vocab.id_of(token).is_some()
    }
}
