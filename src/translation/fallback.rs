/*!
 * Fallback engine adapter.
 *
 * Owns its own model and tokenization, loaded from the local model
 * directory of the language pair. Each line is generated once under the
 * normal policy; a degenerate result is regenerated exactly once under the
 * strict policy and that second result is final.
 *
 * This is the last resort of the pipeline, so `translate` cannot fail: any
 * error or panic below it yields the input text unchanged.
 */

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::errors::EngineError;
use crate::providers::{ModelBackends, Seq2SeqModel};
use crate::translation::decoding::{DecodingPolicy, EscalationLevel};
use crate::translation::quality::QualityDetector;

/// Encoder-decoder fallback with one-step quality escalation
pub struct FallbackTranslator<'a> {
    backends: &'a dyn ModelBackends,
    model_dir: PathBuf,
    detector: QualityDetector,
}

impl<'a> FallbackTranslator<'a> {
    pub fn new(backends: &'a dyn ModelBackends, model_dir: PathBuf) -> Self {
        Self {
            backends,
            model_dir,
            detector: QualityDetector::default(),
        }
    }

    pub fn with_detector(mut self, detector: QualityDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Translate a whole document; returns `text` unchanged on any failure
    pub fn translate(&self, text: &str) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_translate(text))) {
            Ok(Ok(translated)) => translated,
            Ok(Err(e)) => {
                warn!("Fallback translation failed, returning input unchanged: {}", e);
                text.to_string()
            }
            Err(_) => {
                warn!("Fallback translation panicked, returning input unchanged");
                text.to_string()
            }
        }
    }

    fn try_translate(&self, text: &str) -> Result<String, EngineError> {
        info!("Loading fallback model from {}", self.model_dir.display());
        let mut model = self.backends.load_fallback(&self.model_dir)?;
        let lines = text
            .split('\n')
            .map(|line| self.translate_line(model.as_mut(), line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Translate one line, escalating at most once
    pub fn translate_line(&self, model: &mut dyn Seq2SeqModel, line: &str) -> Result<String, EngineError> {
        if line.trim().is_empty() {
            return Ok(line.to_string());
        }

        let char_count = line.chars().count();
        let policy = DecodingPolicy::Fallback;
        let first = model.generate(line, &policy.options_for(char_count, EscalationLevel::Normal))?;
        if !self.detector.is_degenerate(&first) {
            return Ok(first);
        }

        debug!("Degenerate fallback output, retrying with strict decoding");
        model.generate(line, &policy.options_for(char_count, EscalationLevel::Strict))
    }
}
