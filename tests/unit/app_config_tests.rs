/*!
 * Tests for configuration resolution
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ct2_translator::app_config::{Config, LogLevel, FALLBACK_ROOT_ENV, FORCE_FALLBACK_ENV, LOG_LEVEL_ENV};
use ct2_translator::language_utils::LanguagePair;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_fromSource_withFullEnvironment_shouldResolveEverything() {
    let config = Config::from_source(&env(&[
        ("CT2_MODEL_DE_EN", "/models/de-en"),
        ("CT2_MODEL_EN_DE", "/models/en-de"),
        (FORCE_FALLBACK_ENV, "true"),
        (FALLBACK_ROOT_ENV, "/srv/hf"),
        (LOG_LEVEL_ENV, "info"),
    ]));

    let de_en = LanguagePair::resolve("de", "en").unwrap();
    let en_de = LanguagePair::resolve("en", "de").unwrap();
    assert_eq!(config.model_location(&de_en), Some(Path::new("/models/de-en")));
    assert_eq!(config.model_location(&en_de), Some(Path::new("/models/en-de")));
    assert_eq!(config.fallback_dir(&en_de), PathBuf::from("/srv/hf/opus-mt-en-de"));
    assert!(config.force_fallback);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_fromSource_withEmptyValues_shouldTreatAsUnset() {
    let config = Config::from_source(&env(&[("CT2_MODEL_DE_EN", ""), (FALLBACK_ROOT_ENV, "")]));
    let de_en = LanguagePair::resolve("de", "en").unwrap();
    assert_eq!(config.model_location(&de_en), None);
    assert_eq!(config.fallback_dir(&de_en), PathBuf::from("models/hf/opus-mt-de-en"));
}

#[test]
fn test_forceFlag_withNonTrueValues_shouldStayOff() {
    for raw in ["false", "on", "1", "tru"] {
        let config = Config::from_source(&env(&[(FORCE_FALLBACK_ENV, raw)]));
        assert!(!config.force_fallback, "{:?} should not force the fallback", raw);
    }
}

#[test]
fn test_logLevel_shouldMapToLevelFilter() {
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Warn);
    assert_eq!("trace".parse::<LogLevel>().unwrap().to_level_filter(), log::LevelFilter::Trace);
    assert!("verbose".parse::<LogLevel>().is_err());
}

#[test]
fn test_config_shouldRoundTripThroughJson() {
    let config = Config::from_source(&env(&[("CT2_MODEL_DE_EN", "/models/de-en")]));
    let json = serde_json::to_string(&config).unwrap();
    let restored: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.model_locations, config.model_locations);
    assert_eq!(restored.fallback_root, config.fallback_root);

    let minimal: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(minimal.fallback_root, PathBuf::from("models/hf"));
}
