/*!
 * Tests for the fallback beam search through its public API
 */

use std::collections::HashMap;

use ct2_translator::errors::EngineError;
use ct2_translator::translation::decoding::{fallback_options, EscalationLevel};
use ct2_translator::translation::generation::{beam_search, BeamSearchConfig, LogitsSource};

const START: u32 = 0;
const EOS: u32 = 1;

/// Logits depend only on the last id of the prefix
struct BigramSource {
    table: HashMap<u32, Vec<f32>>,
    default: Vec<f32>,
    calls: usize,
}

impl LogitsSource for BigramSource {
    fn next_token_logits(&mut self, prefix: &[u32]) -> Result<Vec<f32>, EngineError> {
        self.calls += 1;
        let last = prefix.last().copied().unwrap_or(START);
        Ok(self.table.get(&last).cloned().unwrap_or_else(|| self.default.clone()))
    }
}

fn looping_source() -> BigramSource {
    BigramSource {
        table: HashMap::new(),
        default: vec![-10.0, -50.0, 3.0, 2.9, -10.0, -10.0],
        calls: 0,
    }
}

fn greedy(repetition_penalty: f32) -> BeamSearchConfig {
    BeamSearchConfig {
        beam_size: 1,
        max_new_tokens: 4,
        length_penalty: 1.0,
        repetition_penalty,
        no_repeat_ngram_size: 0,
        early_stopping: true,
        decoder_start_id: START,
        eos_id: EOS,
        suppressed_ids: Vec::new(),
    }
}

#[test]
fn test_beamSearch_withFallbackPolicy_shouldStopAtEndToken() {
    let mut table = HashMap::new();
    table.insert(START, vec![0.0, -20.0, 5.0, 4.0, 0.0, 0.0]);
    table.insert(2, vec![0.0, 5.0, 0.0, 0.0, 0.0, 0.0]);
    let mut source = BigramSource {
        table,
        default: vec![0.0, -20.0, 0.0, 0.0, 0.0, 0.0],
        calls: 0,
    };

    let options = fallback_options(12, EscalationLevel::Normal);
    let config = BeamSearchConfig::from_options(&options, START, EOS);
    assert_eq!(beam_search(&mut source, &config).unwrap(), vec![2]);
    assert!(source.calls > 0);
}

#[test]
fn test_beamSearch_withoutRepetitionPenalty_shouldLoop() {
    let output = beam_search(&mut looping_source(), &greedy(1.0)).unwrap();
    assert_eq!(output, vec![2, 2, 2, 2]);
}

#[test]
fn test_beamSearch_withRepetitionPenalty_shouldBreakLoop() {
    let output = beam_search(&mut looping_source(), &greedy(1.3)).unwrap();
    assert_eq!(output, vec![2, 3, 2, 2]);
}

#[test]
fn test_beamSearch_withStrictPolicy_shouldBlockRepeatedTrigrams() {
    let options = fallback_options(200, EscalationLevel::Strict);
    let config = BeamSearchConfig::from_options(&options, START, EOS);
    let output = beam_search(&mut looping_source(), &config).unwrap();

    assert!(output.len() <= options.max_length);
    let mut sequence = vec![START];
    sequence.extend(&output);
    let grams: Vec<&[u32]> = sequence.windows(4).collect();
    let unique: std::collections::HashSet<_> = grams.iter().collect();
    assert_eq!(unique.len(), grams.len());
}
