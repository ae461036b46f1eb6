/*!
 * Degenerate-output detection.
 *
 * A decoder that has collapsed tends to repeat the same few words over and
 * over. The detector measures lexical diversity: the share of distinct
 * case-folded word spans among all word spans. Short outputs are never
 * judged, since legitimate text like "no no no" is repetitive too.
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word regex"));

/// Thresholds for the degeneracy check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegeneracyThresholds {
    /// Below this many word spans the text is never flagged
    pub min_words: usize,
    /// Uniqueness ratio under which the text is flagged
    pub min_unique_ratio: f32,
}

impl Default for DegeneracyThresholds {
    fn default() -> Self {
        Self {
            min_words: 8,
            min_unique_ratio: 0.35,
        }
    }
}

/// Lexical diversity statistics of a text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiversityStats {
    pub words: usize,
    pub unique: usize,
}

impl DiversityStats {
    /// Count word spans and distinct case-folded word spans
    pub fn measure(text: &str) -> Self {
        let mut seen = HashSet::new();
        let mut words = 0usize;
        for m in WORD_RE.find_iter(text) {
            words += 1;
            seen.insert(m.as_str().to_lowercase());
        }
        Self {
            words,
            unique: seen.len(),
        }
    }

    pub fn unique_ratio(&self) -> f32 {
        self.unique as f32 / self.words.max(1) as f32
    }
}

/// Judges whether a translation looks like repetition/collapse
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityDetector {
    thresholds: DegeneracyThresholds,
}

impl QualityDetector {
    pub fn new(thresholds: DegeneracyThresholds) -> Self {
        Self { thresholds }
    }

    pub fn is_degenerate(&self, text: &str) -> bool {
        let stats = DiversityStats::measure(text);
        if stats.words < self.thresholds.min_words {
            return false;
        }
        stats.unique_ratio() < self.thresholds.min_unique_ratio
    }
}

/// Degeneracy check with the default thresholds
pub fn is_degenerate(text: &str) -> bool {
    QualityDetector::default().is_degenerate(text)
}
