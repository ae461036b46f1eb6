use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Codes arrive from the command line in whatever form the caller used
/// ("de", "DE", "deu", "ger"). They are normalized to ISO 639-1 before the
/// direction is checked against the fixed set of supported pairs.
/// Static description of one supported translation direction
#[derive(Debug, PartialEq, Eq)]
struct PairSpec {
    source: &'static str,
    target: &'static str,
    // Environment variable holding the primary model location
    model_env: &'static str,
    // Target-language marker understood by multilingual OPUS-MT vocabularies
    target_tag: &'static str,
}

static SUPPORTED_PAIRS: [PairSpec; 2] = [
    PairSpec {
        source: "de",
        target: "en",
        model_env: "CT2_MODEL_DE_EN",
        target_tag: ">>en<<",
    },
    PairSpec {
        source: "en",
        target: "de",
        model_env: "CT2_MODEL_EN_DE",
        target_tag: ">>de<<",
    },
];

/// A supported, ordered source/target language pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    spec: &'static PairSpec,
}

impl LanguagePair {
    /// Resolve a pair from raw codes; `None` when the direction is unsupported
    pub fn resolve(source: &str, target: &str) -> Option<Self> {
        let source = normalize_to_part1_or_part2t(source).ok()?;
        let target = normalize_to_part1_or_part2t(target).ok()?;
        SUPPORTED_PAIRS
            .iter()
            .find(|spec| spec.source == source && spec.target == target)
            .map(|spec| Self { spec })
    }

    /// Every supported pair, in declaration order
    pub fn all() -> impl Iterator<Item = LanguagePair> {
        SUPPORTED_PAIRS.iter().map(|spec| Self { spec })
    }

    pub fn source(&self) -> &'static str {
        self.spec.source
    }

    pub fn target(&self) -> &'static str {
        self.spec.target
    }

    /// Direction label used in result metadata, e.g. "de->en"
    pub fn direction(&self) -> String {
        format!("{}->{}", self.spec.source, self.spec.target)
    }

    /// Name of the environment variable holding the primary model location
    pub fn model_env_var(&self) -> &'static str {
        self.spec.model_env
    }

    /// Target-language tag for tag-primed decoding
    pub fn target_tag(&self) -> &'static str {
        self.spec.target_tag
    }

    /// Directory name of the local fallback model for this pair
    pub fn fallback_model_name(&self) -> String {
        format!("opus-mt-{}-{}", self.spec.source, self.spec.target)
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.spec.source, self.spec.target)
    }
}

/// Map an ISO 639-2/B code to its 639-2/T form; other codes pass through
fn part2b_to_part2t(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        other => other,
    }
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
    } else if normalized_code.len() == 3 {
        let part2t = part2b_to_part2t(&normalized_code);
        if let Some(lang) = Language::from_639_3(part2t) {
            if let Some(code_639_1) = lang.to_639_1() {
                return Ok(code_639_1.to_string());
            }
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}
