/*!
 * Integration tests for the full translation pipeline.
 *
 * Drives backend selection, line-by-line translation, the quality gate and
 * fallback escalation end to end with scripted backends.
 */

use anyhow::Result;

use ct2_translator::app_config::Config;
use ct2_translator::errors::ErrorKind;
use ct2_translator::providers::vocab::VOCAB_FILE;
use ct2_translator::providers::mock::{
    MockBackends, MockFallbackBehavior, MockPrimaryBehavior, MockTokenizer, DEGENERATE_TEXT,
};
use ct2_translator::translation::quality::{DegeneracyThresholds, QualityDetector};
use ct2_translator::translation::tokenizer::{SHARED_SPM_FILE, SIDECAR_VOCAB_FILE, SOURCE_SPM_FILE, TARGET_SPM_FILE};
use ct2_translator::translation::{Provider, TokenizerMode, TranslationPipeline, TranslationResult};

use crate::common::{config_with_de_en_model, create_model_dir, create_temp_dir, create_test_file, init_test_logger};

const DOCUMENT: &str = "hallo welt\n\n   \nwie geht es dir\n";

#[test]
fn test_pipeline_withFallbackOnly_shouldTranslateHalloWelt() {
    init_test_logger();
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);
    let result = TranslationPipeline::new(&Config::default(), &backends).run("de", "en", "Hallo Welt");

    assert_eq!(
        result,
        TranslationResult::success("[hf] Hallo Welt".to_string(), Provider::Hf, "de->en", None)
    );
    assert!(!result.translated.is_empty());
    assert_eq!(backends.primary_loads(), 0);
}

#[test]
fn test_pipeline_withEverySupportedPair_shouldProduceRecord() -> Result<()> {
    init_test_logger();
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let mut config = Config::default();
    config
        .model_locations
        .insert("de->en".to_string(), model_dir.path().to_path_buf());
    config
        .model_locations
        .insert("en->de".to_string(), model_dir.path().to_path_buf());
    let backends = MockBackends::new();

    for (source, target) in [("de", "en"), ("en", "de")] {
        let result = TranslationPipeline::new(&config, &backends).run(source, target, "some text");
        assert!(result.is_success(), "{}->{}", source, target);
        assert_eq!(result.translated, "SOME TEXT");
    }
    Ok(())
}

#[test]
fn test_pipeline_shouldPreserveBlankLinesInPlace() -> Result<()> {
    let model_dir = create_model_dir(&[SOURCE_SPM_FILE, TARGET_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new();

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", DOCUMENT);
    assert_eq!(result.translated, "HALLO WELT\n\n   \nWIE GEHT ES DIR\n");
    assert_eq!(backends.primary_calls(), 2);
    assert_eq!(
        result,
        TranslationResult::success(result.translated.clone(), Provider::Ct2, "de->en", Some(TokenizerMode::Separate))
    );
    Ok(())
}

#[test]
fn test_pipeline_withFallbackBlankLines_shouldPreserveThem() {
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);
    let result = TranslationPipeline::new(&Config::default(), &backends).run("de", "en", DOCUMENT);
    assert_eq!(result.translated, "[hf] hallo welt\n\n   \n[hf] wie geht es dir\n");
    assert_eq!(backends.fallback_calls(), 2);
}

#[test]
fn test_pipeline_withDegeneratePrimary_shouldRetranslateWholeDocument() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new()
        .with_primary(MockPrimaryBehavior::Degenerate)
        .with_fallback(MockFallbackBehavior::Working);

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", DOCUMENT);
    assert_eq!(result.provider(), Provider::Ct2Hf);
    assert_eq!(result.translated, "[hf] hallo welt\n\n   \n[hf] wie geht es dir\n");
    assert_eq!(
        result,
        TranslationResult::success(result.translated.clone(), Provider::Ct2Hf, "de->en", Some(TokenizerMode::Shared))
    );
    Ok(())
}

#[test]
fn test_pipeline_withHealthyPrimaryAndFallback_shouldKeepPrimary() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", DOCUMENT);
    assert_eq!(result.provider(), Provider::Ct2);
    assert_eq!(backends.fallback_loads(), 0);
    Ok(())
}

#[test]
fn test_pipeline_withFallbackEscalation_shouldCapAttemptsPerLine() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new()
        .with_primary(MockPrimaryBehavior::Degenerate)
        .with_fallback(MockFallbackBehavior::AlwaysDegenerate);

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", "eins\nzwei\ndrei");
    assert_eq!(result.provider(), Provider::Ct2Hf);
    assert_eq!(result.translated, [DEGENERATE_TEXT; 3].join("\n"));
    assert_eq!(backends.fallback_calls(), 6);
    Ok(())
}

#[test]
fn test_pipeline_withStrictRetrySucceeding_shouldUseEscalatedOutput() {
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::DegenerateUntilStrict);
    let result = TranslationPipeline::new(&Config::default(), &backends).run("en", "de", "hello\nworld");
    assert_eq!(result.translated, "[hf strict] hello\n[hf strict] world");
    assert_eq!(backends.fallback_calls(), 4);
}

#[test]
fn test_pipeline_withBrokenFallback_shouldPassInputThrough() {
    for behavior in [MockFallbackBehavior::Failing, MockFallbackBehavior::Panicking, MockFallbackBehavior::FailLoad] {
        let backends = MockBackends::new().with_fallback(behavior);
        let result = TranslationPipeline::new(&Config::default(), &backends).run("de", "en", "Hallo Welt");
        assert_eq!(result.provider(), Provider::Hf, "{:?}", behavior);
        assert_eq!(result.translated, "Hallo Welt", "{:?}", behavior);
    }
}

#[test]
fn test_pipeline_withForcedFallback_shouldNotLoadTokenizerDependentPrimary() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let mut config = config_with_de_en_model(model_dir.path());
    config.force_fallback = true;
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", "Hallo");
    assert_eq!(
        result,
        TranslationResult::success("[hf] Hallo".to_string(), Provider::Hf, "de->en", None)
    );
    assert_eq!(backends.primary_loads(), 0);
    Ok(())
}

#[test]
fn test_pipeline_withSidecarTag_shouldPrimePrimaryEngine() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    create_test_file(model_dir.path(), SIDECAR_VOCAB_FILE, r#"[">>en<<", ">>de<<"]"#)?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new();

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", "hallo");
    assert_eq!(result.translated, "HALLO");
    let seen = backends.counters().primary_options.lock().unwrap();
    assert_eq!(seen[0].target_tag.as_deref(), Some(">>en<<"));
    Ok(())
}

#[test]
fn test_pipeline_withOpusMtFallbackDir_shouldTokenizeWithItsVocabulary() -> Result<()> {
    let hf_root = create_temp_dir()?;
    let opus_mt = hf_root.path().join("opus-mt-de-en");
    std::fs::create_dir(&opus_mt)?;
    for file in [SOURCE_SPM_FILE, TARGET_SPM_FILE] {
        create_test_file(&opus_mt, file, "placeholder")?;
    }
    create_test_file(&opus_mt, VOCAB_FILE, r#"{"</s>": 0, "<unk>": 1, ">>en<<": 2}"#)?;
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let mut config = config_with_de_en_model(model_dir.path());
    config.fallback_root = hf_root.path().to_path_buf();
    let backends = MockBackends::new();

    let result = TranslationPipeline::new(&config, &backends).run("de", "en", "hallo");
    assert_eq!(
        result,
        TranslationResult::success("HALLO".to_string(), Provider::Ct2, "de->en", Some(TokenizerMode::Pretrained))
    );
    let seen = backends.counters().primary_options.lock().unwrap();
    assert_eq!(seen[0].target_tag.as_deref(), Some(">>en<<"));
    Ok(())
}

#[test]
fn test_pipeline_withThreeLetterCodes_shouldResolveSupportedPair() {
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);
    let result = TranslationPipeline::new(&Config::default(), &backends).run("deu", "eng", "Hallo");
    assert_eq!(
        result,
        TranslationResult::success("[hf] Hallo".to_string(), Provider::Hf, "de->en", None)
    );
}

#[test]
fn test_pipeline_withPretrainedTokenizerButNoModel_shouldReportModelPathMissing() {
    let backends = MockBackends::new().with_pretrained(MockTokenizer::with_vocab(&[">>en<<"]));
    let result = TranslationPipeline::new(&Config::default(), &backends).run("de", "en", "Hallo");
    assert_eq!(result.reason(), Some(ErrorKind::ModelPathMissing));
}

#[test]
fn test_pipeline_withEmptyInput_shouldReturnEmptyTranslation() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());

    let primary_only = MockBackends::new();
    let result = TranslationPipeline::new(&config, &primary_only).run("de", "en", "");
    assert!(result.is_success());
    assert_eq!(result.translated, "");

    let fallback_only = MockBackends::new().with_fallback(MockFallbackBehavior::Working);
    let result = TranslationPipeline::new(&Config::default(), &fallback_only).run("en", "de", "");
    assert!(result.is_success());
    assert_eq!(result.translated, "");
    assert_eq!(fallback_only.fallback_calls(), 0);
    Ok(())
}

#[test]
fn test_pipeline_withCustomDetector_shouldGateOnItsThresholds() -> Result<()> {
    let model_dir = create_model_dir(&[SHARED_SPM_FILE])?;
    let config = config_with_de_en_model(model_dir.path());
    let backends = MockBackends::new().with_fallback(MockFallbackBehavior::Working);
    let detector = QualityDetector::new(DegeneracyThresholds {
        min_words: 2,
        min_unique_ratio: 0.9,
    });

    let result = TranslationPipeline::new(&config, &backends)
        .with_detector(detector)
        .run("de", "en", "ja ja");
    assert_eq!(result.provider(), Provider::Ct2Hf);
    Ok(())
}
