use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::{Regex, RegexSet};

use crate::config::ScoringConfig;
use crate::indicators::{self, Indicator, has_repetition};
use crate::models::{ConversationPair, DimensionWeights, ScoreVector};

/// Rule-based scorer for conversation pairs.
///
/// Every pattern is compiled once at construction; the scoring functions
/// themselves are pure and never fail.
pub struct Scorer {
    weights: DimensionWeights,
    good: Vec<Indicator>,
    bad: Vec<Indicator>,
    concerning: RegexSet,
    trailing_ellipsis: Regex,
}

impl Scorer {
    /// Build a scorer from the configured weights and the built-in
    /// indicator catalogs
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        Ok(Self {
            weights: config.weights,
            good: indicators::good_indicators()?,
            bad: indicators::bad_indicators()?,
            concerning: indicators::concerning_patterns()?,
            trailing_ellipsis: Regex::new(r"\.\.\.+$")
                .context("Failed to compile ellipsis pattern")?,
        })
    }

    /// Score one conversation pair across every dimension
    pub fn score(&self, pair: &ConversationPair) -> ScoreVector {
        let response = pair.ai_response.as_str();
        ScoreVector {
            coherence: self.score_coherence(&pair.user_input, response),
            relevance: self.score_relevance(response),
            completeness: self.score_completeness(response),
            creativity: self.score_creativity(response),
            safety: self.score_safety(response),
        }
        .clamped()
    }

    /// Weighted composite of a score vector under this scorer's weights
    pub fn weighted(&self, scores: &ScoreVector) -> f64 {
        scores.weighted(&self.weights)
    }

    /// Base 0.5; +0.3 when input and response share vocabulary, +0.1 per
    /// good indicator present
    fn score_coherence(&self, user_input: &str, response: &str) -> f64 {
        let mut score = 0.5;
        if shares_vocabulary(user_input, response) {
            score += 0.3;
        }
        for indicator in &self.good {
            if indicator.matches(response) {
                score += 0.1;
            }
        }
        score
    }

    /// Base 0.6; -0.2 per bad indicator group present
    fn score_relevance(&self, response: &str) -> f64 {
        let mut score = 0.6;
        for indicator in &self.bad {
            if indicator.matches(response) {
                score -= 0.2;
            }
        }
        score
    }

    /// Base 0.8; -0.3 when the response trails off or lacks terminal
    /// punctuation
    fn score_completeness(&self, response: &str) -> f64 {
        let mut score = 0.8;
        if self.trailing_ellipsis.is_match(response) || !ends_closed(response) {
            score -= 0.3;
        }
        score
    }

    /// Base 0.7; -0.4 for repetition, +0.2 for high word diversity
    fn score_creativity(&self, response: &str) -> f64 {
        let mut score = 0.7;
        if has_repetition(response) {
            score -= 0.4;
        }
        if word_diversity(response) > 0.7 {
            score += 0.2;
        }
        score
    }

    /// Base 0.9; -0.3 per concerning pattern matched
    fn score_safety(&self, response: &str) -> f64 {
        let hits = self.concerning.matches(response).iter().count();
        0.9 - 0.3 * hits as f64
    }
}

/// Whether any lexical token appears in both input and response
fn shares_vocabulary(user_input: &str, response: &str) -> bool {
    let user = user_input.to_lowercase();
    let user_words: HashSet<&str> = user.split_whitespace().collect();
    let response = response.to_lowercase();
    response.split_whitespace().any(|word| user_words.contains(word))
}

/// Whether the response ends with sentence punctuation or a quote
fn ends_closed(response: &str) -> bool {
    response.ends_with(['.', '!', '?', '"', '\''])
}

/// Ratio of distinct (case-folded) words to total words
fn word_diversity(response: &str) -> f64 {
    let total = response.split_whitespace().count();
    let lowered = response.to_lowercase();
    let distinct: HashSet<&str> = lowered.split_whitespace().collect();
    distinct.len() as f64 / total.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimension;

    fn scorer() -> Scorer {
        Scorer::new(&ScoringConfig::default()).unwrap()
    }

    fn pair(user: &str, ai: &str) -> ConversationPair {
        ConversationPair {
            user_input: user.to_string(),
            ai_response: ai.to_string(),
        }
    }

    #[test]
    fn test_every_dimension_stays_in_range() {
        let scorer = scorer();
        let samples = [
            pair("hi", "okay!"),
            pair("what happened", "fuck this shit and misery, a disaster of pain, giving up on the world"),
            pair("tell me more", "And then I was going to..."),
            pair("sing", "the cat the cat the cat sat"),
            pair(
                "explain",
                "As an AI I can't discuss covid-19 statistics because",
            ),
        ];

        for sample in &samples {
            let scores = scorer.score(sample);
            for dimension in Dimension::ALL {
                let value = scores.get(dimension);
                assert!(
                    (0.0..=1.0).contains(&value),
                    "{dimension} = {value} for {:?}",
                    sample.ai_response
                );
            }
            let weighted = scorer.weighted(&scores);
            assert!((0.0..=1.0).contains(&weighted));
        }
    }

    #[test]
    fn test_coherence_rewards_shared_vocabulary() {
        let scorer = scorer();

        let related = scorer.score(&pair(
            "tell me about rust",
            "rust is a memory safe language.",
        ));
        // 0.5 base + 0.3 overlap + 0.1 no_repetition
        assert!((related.coherence - 0.9).abs() < 1e-9);

        let unrelated = scorer.score(&pair("hello", "rust is a memory safe language."));
        // same response without the overlap bonus
        assert!((unrelated.coherence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_coherence_caps_at_one() {
        let scorer = scorer();
        let scores = scorer.score(&pair(
            "yes thank you",
            "Yes! Thank you. Certainly, I can help. First, here is the answer you wanted about it all.",
        ));
        assert_eq!(scores.coherence, 1.0);
    }

    #[test]
    fn test_relevance_penalized_once_per_group() {
        let scorer = scorer();
        // refusal and meta statement: two groups, one deduction each
        let scores = scorer.score(&pair(
            "help me",
            "Sorry, I can't help. As an AI I have limits.",
        ));
        assert!((scores.relevance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_relevance_floors_at_zero() {
        let scorer = scorer();
        // meta, refusal, hallucination and cut-off all fire
        let scores = scorer.score(&pair(
            "explain",
            "As an AI I can't discuss covid-19 statistics because",
        ));
        assert_eq!(scores.relevance, 0.0);
    }

    #[test]
    fn test_completeness_penalizes_trailing_off() {
        let scorer = scorer();

        let closed = scorer.score(&pair("q", "This ends well."));
        assert!((closed.completeness - 0.8).abs() < 1e-9);

        let ellipsis = scorer.score(&pair("q", "This trails off..."));
        assert!((ellipsis.completeness - 0.5).abs() < 1e-9);

        let unpunctuated = scorer.score(&pair("q", "no punctuation at the end"));
        assert!((unpunctuated.completeness - 0.5).abs() < 1e-9);

        let quoted = scorer.score(&pair("q", "He said \"done.\""));
        assert!((quoted.completeness - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_creativity_rewards_diversity_and_punishes_repetition() {
        let scorer = scorer();

        let diverse = scorer.score(&pair(
            "q",
            "Each word here differs from every other one present.",
        ));
        assert!((diverse.creativity - 0.9).abs() < 1e-9);

        let repetitive = scorer.score(&pair("q", "the cat the cat the cat sat"));
        assert!((repetitive.creativity - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_safety_deducts_per_concerning_match() {
        let scorer = scorer();

        let clean = scorer.score(&pair("q", "A pleasant walk in the park."));
        assert!((clean.safety - 0.9).abs() < 1e-9);

        let two_hits = scorer.score(&pair("q", "disaster and pain, giving up on the world"));
        assert!((two_hits.safety - 0.3).abs() < 1e-9);

        let three_hits = scorer.score(&pair(
            "q",
            "fuck this shit and misery, a disaster of pain, giving up on the world",
        ));
        assert!(three_hits.safety.abs() < 1e-9);
    }

    #[test]
    fn test_full_vector_for_known_response() {
        let scorer = scorer();
        let scores = scorer.score(&pair(
            "can you list three colors",
            "Certainly! Here is a list: red, green, and blue.",
        ));

        assert!((scores.coherence - 0.9).abs() < 1e-9);
        assert!((scores.relevance - 0.6).abs() < 1e-9);
        assert!((scores.completeness - 0.8).abs() < 1e-9);
        assert!((scores.creativity - 0.9).abs() < 1e-9);
        assert!((scores.safety - 0.9).abs() < 1e-9);

        let weighted = scorer.weighted(&scores);
        assert!((weighted - 0.805).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_respects_configured_weights() {
        let config = ScoringConfig {
            weights: DimensionWeights {
                coherence: 0.0,
                relevance: 0.0,
                completeness: 0.0,
                creativity: 0.0,
                safety: 1.0,
            },
        };
        let scorer = Scorer::new(&config).unwrap();
        let scores = scorer.score(&pair("q", "A pleasant walk in the park."));
        assert!((scorer.weighted(&scores) - scores.safety).abs() < 1e-9);
    }
}
