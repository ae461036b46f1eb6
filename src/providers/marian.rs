/*!
 * Local Marian fallback model on candle.
 *
 * A model directory holds `config.json`, `model.safetensors`, the source and
 * target SentencePiece models and `vocab.json`. Generation runs the shared
 * beam search, recomputing the decoder over the whole prefix for each step.
 */

use std::path::Path;

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use log::debug;

use crate::errors::EngineError;
use crate::providers::spm::SentencePieceModel;
use crate::providers::vocab::PieceTokenizer;
use crate::providers::{PieceModel, Seq2SeqModel};
use crate::translation::decoding::DecodingOptions;
use crate::translation::generation::{beam_search, BeamSearchConfig, LogitsSource};

pub const CONFIG_FILE: &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

fn candle_err(e: candle_core::Error) -> EngineError {
    EngineError::Generation(e.to_string())
}

/// Marian encoder-decoder with its own tokenization
pub struct MarianModel {
    model: MTModel,
    config: MarianConfig,
    tokenizer: PieceTokenizer,
    device: Device,
}

impl MarianModel {
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        let load_err = |message: String| EngineError::LoadFailed {
            path: dir.display().to_string(),
            message,
        };
        let device = Device::Cpu;

        let raw_config = std::fs::read_to_string(dir.join(CONFIG_FILE)).map_err(|e| load_err(e.to_string()))?;
        let config: MarianConfig = serde_json::from_str(&raw_config).map_err(|e| load_err(e.to_string()))?;

        let tensors = candle_core::safetensors::load(dir.join(WEIGHTS_FILE), &device)
            .map_err(|e| load_err(e.to_string()))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = MTModel::new(&config, vb).map_err(|e| load_err(e.to_string()))?;

        let tokenizer = PieceTokenizer::from_dir(dir, |path| {
            Ok(Box::new(SentencePieceModel::open(path)?) as Box<dyn PieceModel>)
        })?;
        debug!("Loaded Marian model from {}", dir.display());

        Ok(Self {
            model,
            config,
            tokenizer,
            device,
        })
    }
}

/// Decoder logits for a fixed encoder output
struct DecoderLogits<'m> {
    model: &'m mut MTModel,
    encoder_xs: Tensor,
    device: &'m Device,
}

impl LogitsSource for DecoderLogits<'_> {
    fn next_token_logits(&mut self, prefix: &[u32]) -> Result<Vec<f32>, EngineError> {
        self.model.reset_kv_cache();
        let input = Tensor::new(prefix, self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(candle_err)?;
        let logits = self
            .model
            .decode(&input, &self.encoder_xs, 0)
            .and_then(|l| l.squeeze(0))
            .map_err(candle_err)?;
        let last = logits.dim(0).map_err(candle_err)?.saturating_sub(1);
        logits
            .i(last)
            .and_then(|l| l.to_dtype(DType::F32))
            .and_then(|l| l.to_vec1::<f32>())
            .map_err(candle_err)
    }
}

impl Seq2SeqModel for MarianModel {
    fn generate(&mut self, line: &str, options: &DecodingOptions) -> Result<String, EngineError> {
        let ids = self.tokenizer.encode_ids(line, self.config.eos_token_id)?;
        let input = Tensor::new(ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(candle_err)?;
        let encoder_xs = self.model.encoder().forward(&input, 0).map_err(candle_err)?;

        let search = BeamSearchConfig::from_options(options, self.config.decoder_start_token_id, self.config.eos_token_id)
            .with_suppressed(vec![self.config.pad_token_id]);
        let mut source = DecoderLogits {
            model: &mut self.model,
            encoder_xs,
            device: &self.device,
        };
        let output = beam_search(&mut source, &search)?;
        Ok(self.tokenizer.decode_ids(&output)?)
    }
}
