/*!
 * Pipeline orchestrator.
 *
 * Backend selection is an explicit state machine:
 *
 * ```text
 * SelectDirection -> SelectTokenizer -> SelectPrimary -> Translate -> QualityGate -> Package
 *                          |                  |              |             |
 *                          +------------------+--------------+-------------+--> Escalate -> Package
 * ```
 *
 * Every state either advances or terminates at `Package` with a result
 * record, so each reason code and each fallback trigger is reachable on its
 * own. The orchestrator never returns an error: failures end up in the
 * record.
 */

use std::path::PathBuf;

use log::{debug, info, warn};

use crate::app_config::Config;
use crate::errors::{EngineError, ErrorKind};
use crate::language_utils::LanguagePair;
use crate::providers::ModelBackends;
use crate::translation::fallback::FallbackTranslator;
use crate::translation::primary::PrimaryTranslator;
use crate::translation::quality::QualityDetector;
use crate::translation::result::{Provider, TranslationResult};
use crate::translation::tokenizer::{select_tokenizer, TokenizerHandle, TokenizerMode};

/// Facts about the request fixed once the direction is known
#[derive(Debug, Clone)]
struct Route {
    pair: LanguagePair,
    fallback_dir: PathBuf,
    fallback_available: bool,
}

/// Orchestrator states
enum Stage {
    SelectDirection,
    SelectTokenizer(Route),
    /// Carries the configured model location and its tokenizer, if any
    SelectPrimary(Route, Option<(PathBuf, TokenizerHandle)>),
    Translate(Route, PrimaryTranslator),
    QualityGate(Route, String, TokenizerMode),
    Escalate(Route, Provider, Option<TokenizerMode>),
    Package(TranslationResult),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Self::SelectDirection => "SelectDirection",
            Self::SelectTokenizer(..) => "SelectTokenizer",
            Self::SelectPrimary(..) => "SelectPrimary",
            Self::Translate(..) => "Translate",
            Self::QualityGate(..) => "QualityGate",
            Self::Escalate(..) => "Escalate",
            Self::Package(..) => "Package",
        }
    }
}

/// One invocation of the translation shim
pub struct TranslationPipeline<'a> {
    config: &'a Config,
    backends: &'a dyn ModelBackends,
    detector: QualityDetector,
}

impl<'a> TranslationPipeline<'a> {
    pub fn new(config: &'a Config, backends: &'a dyn ModelBackends) -> Self {
        Self {
            config,
            backends,
            detector: QualityDetector::default(),
        }
    }

    pub fn with_detector(mut self, detector: QualityDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Run the state machine to completion; always yields a record
    pub fn run(&self, source: &str, target: &str, text: &str) -> TranslationResult {
        let mut stage = Stage::SelectDirection;
        loop {
            debug!("Pipeline stage: {}", stage.name());
            stage = match stage {
                Stage::Package(result) => return result,
                Stage::SelectDirection => self.select_direction(source, target, text),
                Stage::SelectTokenizer(route) => self.select_tokenizer(route, text),
                Stage::SelectPrimary(route, primary) => self.select_primary(route, primary, text),
                Stage::Translate(route, primary) => self.translate(route, primary, text),
                Stage::QualityGate(route, translated, mode) => self.quality_gate(route, translated, mode),
                Stage::Escalate(route, provider, mode) => self.escalate(route, provider, mode, text),
            };
        }
    }

    fn select_direction(&self, source: &str, target: &str, text: &str) -> Stage {
        let Some(pair) = LanguagePair::resolve(source, target) else {
            warn!("Unsupported direction {}->{}", source, target);
            return Stage::Package(TranslationResult::failure(text, ErrorKind::UnsupportedDirection));
        };

        let fallback_dir = self.config.fallback_dir(&pair);
        let fallback_available = self.backends.has_fallback(&fallback_dir);
        info!(
            "Direction {}; fallback model {} ({})",
            pair,
            fallback_dir.display(),
            if fallback_available { "available" } else { "absent" }
        );
        Stage::SelectTokenizer(Route {
            pair,
            fallback_dir,
            fallback_available,
        })
    }

    fn select_tokenizer(&self, route: Route, text: &str) -> Stage {
        let Some(location) = self.config.model_location(&route.pair) else {
            return Stage::SelectPrimary(route, None);
        };
        match select_tokenizer(self.backends, &route.fallback_dir, location) {
            Ok(tokenizer) => Stage::SelectPrimary(route, Some((location.to_path_buf(), tokenizer))),
            Err(e) if route.fallback_available => {
                warn!("Tokenizer unavailable for primary engine ({}); using fallback", e);
                Stage::Escalate(route, Provider::Hf, None)
            }
            Err(e) => {
                warn!("Tokenizer unavailable for primary engine: {}", e);
                Stage::Package(TranslationResult::failure(text, e.reason()))
            }
        }
    }

    fn select_primary(&self, route: Route, primary: Option<(PathBuf, TokenizerHandle)>, text: &str) -> Stage {
        if self.config.force_fallback && route.fallback_available {
            info!("Fallback engine forced by configuration");
            return Stage::Escalate(route, Provider::Hf, None);
        }

        let Some((location, tokenizer)) = primary else {
            if route.fallback_available {
                info!("No primary model configured for {}; using fallback", route.pair);
                return Stage::Escalate(route, Provider::Hf, None);
            }
            return Stage::Package(TranslationResult::failure(text, ErrorKind::ModelPathMissing));
        };

        match self.backends.load_primary(&location) {
            Ok(engine) => {
                let primary = PrimaryTranslator::new(engine, tokenizer, route.pair.target_tag());
                info!(
                    "Loaded primary engine from {} ({} tokenizer, tag {})",
                    location.display(),
                    primary.tokenizer_mode(),
                    primary.target_tag().unwrap_or("none")
                );
                Stage::Translate(route, primary)
            }
            Err(EngineError::Unavailable(what)) => {
                warn!("Primary engine unavailable: {}", what);
                self.without_primary(route, ErrorKind::DepsMissing, text)
            }
            Err(e) => {
                warn!("{}", e);
                Stage::Package(TranslationResult::failure(text, ErrorKind::ModelLoadFailed))
            }
        }
    }

    fn translate(&self, route: Route, primary: PrimaryTranslator, text: &str) -> Stage {
        let mode = primary.tokenizer_mode();
        match primary.translate(text) {
            Ok(translated) if route.fallback_available => Stage::QualityGate(route, translated, mode),
            Ok(translated) => Stage::Package(TranslationResult::success(
                translated,
                Provider::Ct2,
                route.pair.direction(),
                Some(mode),
            )),
            Err(e) if route.fallback_available => {
                warn!("Primary translation failed ({}); using fallback", e);
                Stage::Escalate(route, Provider::Hf, None)
            }
            Err(e) => {
                warn!("Primary translation failed: {}", e);
                Stage::Package(TranslationResult::failure(text, ErrorKind::TranslateFailed))
            }
        }
    }

    /// Judges the whole document, never single lines
    fn quality_gate(&self, route: Route, translated: String, mode: TokenizerMode) -> Stage {
        if self.detector.is_degenerate(&translated) {
            warn!("Primary output looks degenerate; re-translating with fallback");
            return Stage::Escalate(route, Provider::Ct2Hf, Some(mode));
        }
        Stage::Package(TranslationResult::success(
            translated,
            Provider::Ct2,
            route.pair.direction(),
            Some(mode),
        ))
    }

    fn escalate(&self, route: Route, provider: Provider, mode: Option<TokenizerMode>, text: &str) -> Stage {
        let translated = FallbackTranslator::new(self.backends, route.fallback_dir.clone())
            .with_detector(self.detector)
            .translate(text);
        Stage::Package(TranslationResult::success(
            translated,
            provider,
            route.pair.direction(),
            mode,
        ))
    }

    fn without_primary(&self, route: Route, reason: ErrorKind, text: &str) -> Stage {
        if route.fallback_available {
            Stage::Escalate(route, Provider::Hf, None)
        } else {
            Stage::Package(TranslationResult::failure(text, reason))
        }
    }
}

/// Convenience entry point for a single invocation
pub fn translate_text(
    config: &Config,
    backends: &dyn ModelBackends,
    source: &str,
    target: &str,
    text: &str,
) -> TranslationResult {
    TranslationPipeline::new(config, backends).run(source, target, text)
}
