/*!
 * Beam search over an encoder-decoder model.
 *
 * The search only needs next-token logits for a decoder prefix, so any
 * model (or a scripted test double) can drive it through `LogitsSource`.
 * Scoring follows the usual seq2seq conventions: log-probabilities summed
 * per beam, finished hypotheses normalized by `len^length_penalty`,
 * repetition penalty on already-generated ids, and n-gram blocking.
 */

use crate::errors::EngineError;
use crate::translation::decoding::DecodingOptions;

/// Provides next-token logits for a decoder prefix
pub trait LogitsSource {
    /// `prefix` always starts with the decoder start id
    fn next_token_logits(&mut self, prefix: &[u32]) -> Result<Vec<f32>, EngineError>;
}

/// Parameters of one beam search run
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSearchConfig {
    pub beam_size: usize,
    pub max_new_tokens: usize,
    pub length_penalty: f32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: usize,
    pub early_stopping: bool,
    pub decoder_start_id: u32,
    pub eos_id: u32,
    /// Ids that may never be generated (e.g. padding)
    pub suppressed_ids: Vec<u32>,
}

impl BeamSearchConfig {
    pub fn from_options(options: &DecodingOptions, decoder_start_id: u32, eos_id: u32) -> Self {
        Self {
            beam_size: options.beam_size.max(1),
            max_new_tokens: options.max_length,
            length_penalty: options.length_penalty,
            repetition_penalty: options.repetition_penalty,
            no_repeat_ngram_size: options.no_repeat_ngram_size,
            early_stopping: options.early_stopping,
            decoder_start_id,
            eos_id,
            suppressed_ids: Vec::new(),
        }
    }

    pub fn with_suppressed(mut self, ids: Vec<u32>) -> Self {
        self.suppressed_ids = ids;
        self
    }
}

#[derive(Debug, Clone)]
struct Beam {
    tokens: Vec<u32>,
    score: f32,
}

#[derive(Debug, Clone)]
struct Hypothesis {
    tokens: Vec<u32>,
    score: f32,
}

fn normalized_score(sum_log_probs: f32, len: usize, length_penalty: f32) -> f32 {
    sum_log_probs / (len.max(1) as f32).powf(length_penalty)
}

/// Best `capacity` finished hypotheses, best first
struct FinishedHypotheses {
    capacity: usize,
    length_penalty: f32,
    items: Vec<Hypothesis>,
}

impl FinishedHypotheses {
    fn new(capacity: usize, length_penalty: f32) -> Self {
        Self {
            capacity,
            length_penalty,
            items: Vec::with_capacity(capacity + 1),
        }
    }

    fn add(&mut self, tokens: Vec<u32>, sum_log_probs: f32) {
        let score = normalized_score(sum_log_probs, tokens.len(), self.length_penalty);
        self.items.push(Hypothesis { tokens, score });
        self.items.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.items.truncate(self.capacity);
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    fn worst_score(&self) -> Option<f32> {
        self.items.last().map(|h| h.score)
    }

    fn into_best(self) -> Option<Hypothesis> {
        self.items.into_iter().next()
    }
}

/// Penalize logits of ids already present in the prefix
pub fn apply_repetition_penalty(logits: &mut [f32], prefix: &[u32], penalty: f32) {
    if penalty == 1.0 {
        return;
    }
    let mut seen = std::collections::HashSet::new();
    for &id in prefix {
        if !seen.insert(id) {
            continue;
        }
        if let Some(logit) = logits.get_mut(id as usize) {
            *logit = if *logit < 0.0 { *logit * penalty } else { *logit / penalty };
        }
    }
}

/// Ids that would complete an n-gram already present in the prefix
pub fn banned_ngram_tokens(prefix: &[u32], ngram_size: usize) -> Vec<u32> {
    if ngram_size == 0 || prefix.len() + 1 < ngram_size {
        return Vec::new();
    }
    let context = &prefix[prefix.len() + 1 - ngram_size..];
    prefix
        .windows(ngram_size)
        .filter(|window| &window[..ngram_size - 1] == context)
        .map(|window| window[ngram_size - 1])
        .collect()
}

/// Numerically stable log-softmax; `-inf` entries stay `-inf`
pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|l| l.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f32::NEG_INFINITY; logits.len()];
    }
    let sum: f32 = logits
        .iter()
        .filter(|l| l.is_finite())
        .map(|l| (l - max).exp())
        .sum();
    let log_sum = sum.ln();
    logits
        .iter()
        .map(|l| if l.is_finite() { l - max - log_sum } else { f32::NEG_INFINITY })
        .collect()
}

/// Run beam search and return the generated ids (without start and end ids)
pub fn beam_search(source: &mut dyn LogitsSource, config: &BeamSearchConfig) -> Result<Vec<u32>, EngineError> {
    let beam_size = config.beam_size.max(1);
    let mut beams = vec![Beam {
        tokens: vec![config.decoder_start_id],
        score: 0.0,
    }];
    let mut finished = FinishedHypotheses::new(beam_size, config.length_penalty);
    let mut done = false;

    for _ in 0..config.max_new_tokens {
        let mut candidates: Vec<(usize, u32, f32)> = Vec::new();
        for (index, beam) in beams.iter().enumerate() {
            let mut logits = source.next_token_logits(&beam.tokens)?;
            apply_repetition_penalty(&mut logits, &beam.tokens, config.repetition_penalty);
            let banned = config
                .suppressed_ids
                .iter()
                .copied()
                .chain(banned_ngram_tokens(&beam.tokens, config.no_repeat_ngram_size));
            for id in banned {
                if let Some(logit) = logits.get_mut(id as usize) {
                    *logit = f32::NEG_INFINITY;
                }
            }

            let mut ranked: Vec<(u32, f32)> = log_softmax(&logits)
                .into_iter()
                .enumerate()
                .filter(|(_, lp)| lp.is_finite())
                .map(|(id, lp)| (id as u32, beam.score + lp))
                .collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            ranked.truncate(2 * beam_size);
            candidates.extend(ranked.into_iter().map(|(id, score)| (index, id, score)));
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

        let mut next = Vec::with_capacity(beam_size);
        for (rank, (index, id, score)) in candidates.into_iter().enumerate() {
            if id == config.eos_id {
                // an end id only counts when it ranks inside the beam
                if rank < beam_size {
                    finished.add(beams[index].tokens.clone(), score);
                }
                continue;
            }
            let mut tokens = beams[index].tokens.clone();
            tokens.push(id);
            next.push(Beam { tokens, score });
            if next.len() == beam_size {
                break;
            }
        }
        beams = next;

        if beams.is_empty() {
            break;
        }
        if finished.is_full() {
            if config.early_stopping {
                done = true;
                break;
            }
            let best_running = beams
                .iter()
                .map(|b| normalized_score(b.score, b.tokens.len(), config.length_penalty))
                .fold(f32::NEG_INFINITY, f32::max);
            if finished.worst_score().is_some_and(|worst| worst >= best_running) {
                done = true;
                break;
            }
        }
    }

    // beams still running at the length cap compete with the finished ones
    if !done {
        for beam in beams {
            finished.add(beam.tokens, beam.score);
        }
    }

    Ok(finished
        .into_best()
        .map(|h| h.tokens.into_iter().skip(1).collect())
        .unwrap_or_default())
}
