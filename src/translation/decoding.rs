/*!
 * Decoding-parameter policy.
 *
 * Generation parameters are derived per line from the line's length and an
 * escalation level. The primary engine measures length in source tokens;
 * the fallback engine measures it in characters of the raw line.
 */

/// End-of-sequence marker enforced on the primary engine
pub const END_TOKEN: &str = "</s>";

/// How strict a generation attempt is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum EscalationLevel {
    /// First attempt
    #[default]
    Normal,
    /// Retry after a degenerate result
    Strict,
}

/// Generation parameters for one line
#[derive(Debug, Clone, PartialEq)]
pub struct DecodingOptions {
    pub beam_size: usize,
    pub length_penalty: f32,
    /// Decoding length cap (total for the primary engine, new tokens for the fallback)
    pub max_length: usize,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: usize,
    /// Never generate the unknown token
    pub disable_unk: bool,
    /// Explicit end-of-sequence token, if the engine needs one
    pub end_token: Option<String>,
    /// Stop once `beam_size` hypotheses have finished
    pub early_stopping: bool,
    /// Forced decoding prefix
    pub target_tag: Option<String>,
}

impl DecodingOptions {
    pub fn with_target_tag(mut self, tag: Option<String>) -> Self {
        self.target_tag = tag;
        self
    }
}

/// Which engine family the options are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingPolicy {
    /// Compiled engine, length measured in tokens
    Primary,
    /// Encoder-decoder fallback, length measured in characters
    Fallback,
}

impl DecodingPolicy {
    pub fn options_for(&self, len: usize, level: EscalationLevel) -> DecodingOptions {
        match self {
            Self::Primary => primary_options(len),
            Self::Fallback => fallback_options(len, level),
        }
    }
}

/// Primary-engine options; escalation does not apply to this engine
pub fn primary_options(token_count: usize) -> DecodingOptions {
    let max_length = token_count.saturating_mul(3).saturating_add(20).clamp(32, 256);
    DecodingOptions {
        beam_size: 4,
        length_penalty: 1.0,
        max_length,
        repetition_penalty: 1.1,
        no_repeat_ngram_size: 3,
        disable_unk: true,
        end_token: Some(END_TOKEN.to_string()),
        early_stopping: false,
        target_tag: None,
    }
}

/// Cap on new tokens for the fallback engine
pub fn fallback_max_new_tokens(char_count: usize) -> usize {
    ((char_count as f64 * 0.6 + 16.0) as usize).clamp(16, 64)
}

/// Fallback-engine options at the given escalation level
pub fn fallback_options(char_count: usize, level: EscalationLevel) -> DecodingOptions {
    let max_length = fallback_max_new_tokens(char_count);
    let (beam_size, length_penalty, repetition_penalty, no_repeat_ngram_size) = match level {
        EscalationLevel::Normal => (5, 0.9, 1.15, 3),
        EscalationLevel::Strict => (6, 0.8, 1.3, 4),
    };
    DecodingOptions {
        beam_size,
        length_penalty,
        max_length,
        repetition_penalty,
        no_repeat_ngram_size,
        disable_unk: false,
        end_token: None,
        early_stopping: true,
        target_tag: None,
    }
}
