/*!
 * CTranslate2 primary engine via `ct2rs`.
 */

use std::path::Path;

use ct2rs::sys::{Config as Ct2Config, TranslationOptions, Translator};
use log::debug;

use crate::errors::EngineError;
use crate::providers::PrimaryEngine;
use crate::translation::decoding::DecodingOptions;

/// A converted CTranslate2 model directory
pub struct Ct2Engine {
    translator: Translator,
}

impl Ct2Engine {
    pub fn load(location: &Path) -> Result<Self, EngineError> {
        Translator::new(location, &Ct2Config::default())
            .map(|translator| Self { translator })
            .map_err(|e| EngineError::LoadFailed {
                path: location.display().to_string(),
                message: e.to_string(),
            })
    }
}

fn translation_options(options: &DecodingOptions) -> TranslationOptions<String, String> {
    TranslationOptions {
        beam_size: options.beam_size,
        length_penalty: options.length_penalty,
        max_decoding_length: options.max_length,
        repetition_penalty: options.repetition_penalty,
        no_repeat_ngram_size: options.no_repeat_ngram_size,
        disable_unk: options.disable_unk,
        end_token: options.end_token.iter().cloned().collect(),
        use_vmap: true,
        ..Default::default()
    }
}

impl PrimaryEngine for Ct2Engine {
    fn translate(&self, tokens: &[String], options: &DecodingOptions) -> Result<Vec<String>, EngineError> {
        let source = vec![tokens.to_vec()];
        let ct2_options = translation_options(options);
        let results = match &options.target_tag {
            Some(tag) => {
                debug!("Forcing target prefix {}", tag);
                self.translator
                    .translate_batch_with_target_prefix(&source, &[vec![tag.clone()]], &ct2_options, None)
            }
            None => self.translator.translate_batch(&source, &ct2_options, None),
        }
        .map_err(|e| EngineError::Generation(e.to_string()))?;

        results
            .into_iter()
            .next()
            .and_then(|result| result.hypotheses.into_iter().next())
            .ok_or(EngineError::EmptyOutput)
    }
}
