//! Candidate scoring and winner selection.
//!
//! The evaluator is deterministic: the same candidate set always produces
//! the same outcome, whatever order the candidates finished in. Scoring is
//! a weighted heuristic over citation count, answer length, and refusal
//! phrasing, with every weight exposed through [`ScoringConfig`].

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::outcome::{GenerationResult, PipelineOutcome};

/// Weights and thresholds for candidate scoring.
///
/// All fields have working defaults; override them through configuration to
/// tune the heuristic without code changes.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Starting score before any signal is applied.
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Added per distinct citation, up to the saturation count.
    #[serde(default = "default_citation_weight")]
    pub citation_weight: f64,

    /// Citations beyond this count stop adding score.
    #[serde(default = "default_citation_saturation")]
    pub citation_saturation: usize,

    /// Shortest answer length (in characters) considered substantive.
    #[serde(default = "default_length_floor")]
    pub length_floor: usize,

    /// Longest answer length (in characters) before the rambling penalty.
    #[serde(default = "default_length_ceiling")]
    pub length_ceiling: usize,

    /// Added when the answer length falls inside the band.
    #[serde(default = "default_length_weight")]
    pub length_weight: f64,

    /// Subtracted when the answer is shorter than the floor.
    #[serde(default = "default_short_penalty")]
    pub short_penalty: f64,

    /// Subtracted when the answer is longer than the ceiling.
    #[serde(default = "default_long_penalty")]
    pub long_penalty: f64,

    /// Subtracted once per refusal phrase found in the answer.
    #[serde(default = "default_refusal_penalty")]
    pub refusal_penalty: f64,

    /// Case-insensitive phrases that mark a refusal or non-answer.
    #[serde(default = "default_refusal_phrases")]
    pub refusal_phrases: Vec<String>,

    /// Minimum winning score; below this the run reports no reliable hint.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl ScoringConfig {
    /// Validate scoring configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ValidationError::invalid_format(
                "scoring.min_confidence",
                "must be between 0 and 1",
            ));
        }
        if self.length_floor > self.length_ceiling {
            return Err(ValidationError::invalid_format(
                "scoring.length_floor",
                "must not exceed length_ceiling",
            ));
        }
        let weights = [
            self.baseline,
            self.citation_weight,
            self.length_weight,
            self.short_penalty,
            self.long_penalty,
            self.refusal_penalty,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ValidationError::invalid_format(
                "scoring",
                "weights must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            citation_weight: default_citation_weight(),
            citation_saturation: default_citation_saturation(),
            length_floor: default_length_floor(),
            length_ceiling: default_length_ceiling(),
            length_weight: default_length_weight(),
            short_penalty: default_short_penalty(),
            long_penalty: default_long_penalty(),
            refusal_penalty: default_refusal_penalty(),
            refusal_phrases: default_refusal_phrases(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_baseline() -> f64 {
    0.5
}

fn default_citation_weight() -> f64 {
    0.15
}

fn default_citation_saturation() -> usize {
    3
}

fn default_length_floor() -> usize {
    40
}

fn default_length_ceiling() -> usize {
    1200
}

fn default_length_weight() -> f64 {
    0.10
}

fn default_short_penalty() -> f64 {
    0.35
}

fn default_long_penalty() -> f64 {
    0.15
}

fn default_refusal_penalty() -> f64 {
    0.25
}

fn default_refusal_phrases() -> Vec<String> {
    [
        "i cannot",
        "i can't",
        "i'm sorry",
        "i am sorry",
        "i couldn't find",
        "could not find",
        "no information available",
        "as an ai",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_min_confidence() -> f64 {
    0.45
}

/// One signal that contributed to a candidate's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum ScoreFactor {
    Baseline { value: f64 },
    Citations { count: usize, applied: usize },
    LengthInBand { chars: usize },
    TooShort { chars: usize },
    TooLong { chars: usize },
    RefusalPhrase { phrase: String },
}

/// A candidate with its reliability score and the factors behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub result: GenerationResult,
    pub score: f64,
    pub factors: Vec<ScoreFactor>,
}

/// Deterministic reliability scoring over generated candidates.
pub struct Evaluator {
    config: ScoringConfig,
}

impl Evaluator {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores a single candidate. Scores are clamped to [0, 1].
    pub fn score(&self, result: &GenerationResult) -> ScoredCandidate {
        let config = &self.config;
        let mut factors = Vec::new();
        let mut score = config.baseline;
        factors.push(ScoreFactor::Baseline {
            value: config.baseline,
        });

        let citations = result.citation_count();
        if citations > 0 {
            let applied = citations.min(config.citation_saturation);
            score += applied as f64 * config.citation_weight;
            factors.push(ScoreFactor::Citations {
                count: citations,
                applied,
            });
        }

        let chars = result.text().chars().count();
        if chars < config.length_floor {
            score -= config.short_penalty;
            factors.push(ScoreFactor::TooShort { chars });
        } else if chars > config.length_ceiling {
            score -= config.long_penalty;
            factors.push(ScoreFactor::TooLong { chars });
        } else {
            score += config.length_weight;
            factors.push(ScoreFactor::LengthInBand { chars });
        }

        let lowered = result.text().to_lowercase();
        for phrase in &config.refusal_phrases {
            if lowered.contains(phrase.as_str()) {
                score -= config.refusal_penalty;
                factors.push(ScoreFactor::RefusalPhrase {
                    phrase: phrase.clone(),
                });
            }
        }

        ScoredCandidate {
            result: result.clone(),
            score: score.clamp(0.0, 1.0),
            factors,
        }
    }

    /// Scores every candidate and picks the winner.
    ///
    /// The winner is the highest-scoring candidate at or above the
    /// confidence threshold; score ties go to the candidate from the
    /// earlier chain entry. An empty candidate set, or a best score below
    /// the threshold, yields [`PipelineOutcome::NoReliableHint`].
    pub fn evaluate(&self, candidates: &[GenerationResult]) -> PipelineOutcome {
        let mut best: Option<ScoredCandidate> = None;

        for result in candidates {
            let scored = self.score(result);
            let replace = match &best {
                None => true,
                Some(current) => {
                    scored.score > current.score
                        || (scored.score == current.score
                            && scored.result.origin().index() < current.result.origin().index())
                }
            };
            if replace {
                best = Some(scored);
            }
        }

        match best {
            Some(winner) if winner.score >= self.config.min_confidence => {
                let origin = winner.result.origin();
                PipelineOutcome::guide(
                    winner.result.text(),
                    origin.provider(),
                    origin.model(),
                    winner.score,
                )
            }
            _ => PipelineOutcome::NoReliableHint,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::{ProviderChain, ProviderKind, ProviderSpec};
    use crate::domain::outcome::Citation;

    fn two_entry_chain() -> ProviderChain {
        ProviderChain::new(vec![
            ProviderSpec::new(ProviderKind::Gemini, vec!["gemini-2.5-flash".to_string()])
                .unwrap(),
            ProviderSpec::new(ProviderKind::OpenAi, vec!["gpt-4o-mini".to_string()]).unwrap(),
        ])
    }

    fn result_at(chain: &ProviderChain, index: usize, text: &str, urls: &[&str]) -> GenerationResult {
        GenerationResult::new(
            text,
            urls.iter().map(|u| Citation::new(*u)).collect(),
            chain.entries()[index].clone(),
        )
    }

    const SOLID_ANSWER: &str =
        "Head to the Mantis Village bench, then challenge the Mantis Lords from the arena below.";

    #[test]
    fn test_citations_raise_score_until_saturation() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let none = evaluator.score(&result_at(&chain, 0, SOLID_ANSWER, &[]));
        let two = evaluator.score(&result_at(
            &chain,
            0,
            SOLID_ANSWER,
            &["https://a.example", "https://b.example"],
        ));
        let five = evaluator.score(&result_at(
            &chain,
            0,
            SOLID_ANSWER,
            &[
                "https://a.example",
                "https://b.example",
                "https://c.example",
                "https://d.example",
                "https://e.example",
            ],
        ));
        let three = evaluator.score(&result_at(
            &chain,
            0,
            SOLID_ANSWER,
            &["https://a.example", "https://b.example", "https://c.example"],
        ));

        assert!(two.score > none.score);
        assert!(three.score > two.score);
        assert_eq!(five.score, three.score);
        assert!(five
            .factors
            .contains(&ScoreFactor::Citations { count: 5, applied: 3 }));
    }

    #[test]
    fn test_short_answer_penalized_below_threshold() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let scored = evaluator.score(&result_at(&chain, 0, "Go left.", &[]));
        assert!(scored.score < evaluator.config().min_confidence);
        assert!(matches!(scored.factors[1], ScoreFactor::TooShort { chars: 8 }));
    }

    #[test]
    fn test_refusal_phrases_penalized() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let honest = evaluator.score(&result_at(&chain, 0, SOLID_ANSWER, &[]));
        let refusal = evaluator.score(&result_at(
            &chain,
            0,
            "I'm sorry, but I couldn't find any walkthrough covering this part of the game.",
            &[],
        ));

        assert!(refusal.score < honest.score);
        assert!(refusal
            .factors
            .iter()
            .any(|f| matches!(f, ScoreFactor::RefusalPhrase { .. })));
    }

    #[test]
    fn test_scores_clamped_to_unit_interval() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::new(ScoringConfig {
            refusal_penalty: 5.0,
            ..ScoringConfig::default()
        });

        let scored = evaluator.score(&result_at(&chain, 0, "I cannot help.", &[]));
        assert_eq!(scored.score, 0.0);
    }

    #[test]
    fn test_evaluate_empty_set_is_no_reliable_hint() {
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.evaluate(&[]), PipelineOutcome::NoReliableHint);
    }

    #[test]
    fn test_evaluate_rejects_best_below_threshold() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let outcome = evaluator.evaluate(&[result_at(&chain, 0, "No idea.", &[])]);
        assert_eq!(outcome, PipelineOutcome::NoReliableHint);
    }

    #[test]
    fn test_evaluate_picks_highest_score() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let weak = result_at(&chain, 0, SOLID_ANSWER, &[]);
        let strong = result_at(&chain, 1, SOLID_ANSWER, &["https://a.example", "https://b.example"]);

        let outcome = evaluator.evaluate(&[weak, strong]);
        match outcome {
            PipelineOutcome::Guide { provider, model, .. } => {
                assert_eq!(provider, ProviderKind::OpenAi);
                assert_eq!(model, "gpt-4o-mini");
            }
            other => panic!("expected a guide, got {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_tie_goes_to_earlier_chain_entry() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        let later = result_at(&chain, 1, SOLID_ANSWER, &["https://a.example"]);
        let earlier = result_at(&chain, 0, SOLID_ANSWER, &["https://b.example"]);

        // Identical factor sets, so the scores tie exactly.
        let outcome = evaluator.evaluate(&[later.clone(), earlier.clone()]);
        match outcome {
            PipelineOutcome::Guide { provider, .. } => {
                assert_eq!(provider, ProviderKind::Gemini);
            }
            other => panic!("expected a guide, got {other:?}"),
        }

        // Same winner regardless of input order.
        let reversed = evaluator.evaluate(&[earlier, later]);
        assert_eq!(outcome, reversed);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();
        let candidates = vec![
            result_at(&chain, 0, SOLID_ANSWER, &["https://a.example"]),
            result_at(&chain, 1, "No idea.", &[]),
            result_at(&chain, 1, SOLID_ANSWER, &["https://b.example", "https://c.example"]),
        ];

        let first = evaluator.evaluate(&candidates);
        let second = evaluator.evaluate(&candidates);

        assert_eq!(first, second);
    }

    #[test]
    fn test_three_way_tie_resolves_by_origin_not_position() {
        let chain = two_entry_chain();
        let evaluator = Evaluator::default();

        // High, low, high; the two highs tie exactly and the later-listed
        // one comes from the earlier chain entry.
        let candidates = vec![
            result_at(&chain, 1, SOLID_ANSWER, &["https://a.example", "https://b.example"]),
            result_at(&chain, 0, "No idea.", &[]),
            result_at(&chain, 0, SOLID_ANSWER, &["https://c.example", "https://d.example"]),
        ];

        match evaluator.evaluate(&candidates) {
            PipelineOutcome::Guide { provider, .. } => {
                assert_eq!(provider, ProviderKind::Gemini);
            }
            other => panic!("expected a guide, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = ScoringConfig {
            min_confidence: 1.5,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_length_band() {
        let config = ScoringConfig {
            length_floor: 2000,
            length_ceiling: 100,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }
}
