/*!
 * Tests for language utility functions
 */

use ct2_translator::language_utils::{normalize_to_part1_or_part2t, LanguagePair};

/// Test normalization of language codes to ISO 639-1 format
#[test]
fn test_normalize_to_part1_or_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part1_or_part2t("de").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("ger").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t(" EN ").unwrap(), "en");
}

#[test]
fn test_normalize_to_part1_or_part2t_withInvalidCodes_shouldFail() {
    assert!(normalize_to_part1_or_part2t("xyz").is_err());
    assert!(normalize_to_part1_or_part2t("e").is_err());
    assert!(normalize_to_part1_or_part2t("").is_err());
}

#[test]
fn test_languagePair_withEverySupportedDirection_shouldExposeRouting() {
    for pair in LanguagePair::all() {
        let resolved = LanguagePair::resolve(pair.source(), pair.target()).unwrap();
        assert_eq!(resolved, pair);
        assert!(pair.target_tag().contains(pair.target()));
        assert!(pair.model_env_var().starts_with("CT2_MODEL_"));
        assert_eq!(pair.fallback_model_name(), format!("opus-mt-{}-{}", pair.source(), pair.target()));
        assert_eq!(pair.to_string(), pair.direction());
    }
}

#[test]
fn test_languagePair_withReversedOrUnknownDirection_shouldBeUnsupported() {
    assert!(LanguagePair::resolve("fr", "es").is_none());
    assert!(LanguagePair::resolve("de", "fr").is_none());
    assert!(LanguagePair::resolve("de", "de").is_none());
}

#[test]
fn test_languagePair_withThreeLetterCodes_shouldMatchTwoLetterPair() {
    assert_eq!(LanguagePair::resolve("deu", "eng"), LanguagePair::resolve("de", "en"));
    assert_eq!(LanguagePair::resolve("deu", "eng").unwrap().direction(), "de->en");
}
