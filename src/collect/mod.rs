// src/collect/mod.rs
// Dedup/rank stage: validity filter, per-key collapse, stable ordering.

pub mod adapters;
pub mod normalize;
pub mod score;

use std::collections::HashMap;

use crate::collect::normalize::DedupKey;
use crate::model::{RawSignal, ScoredSignal, HOT_KEY_MAX_LENGTH};

/// A signal is spam/invalid when the keyword is degenerate: wrong length,
/// all digits+whitespace, all punctuation, or all whitespace.
pub fn is_valid_signal(signal: &RawSignal) -> bool {
    let kw = signal.keyword.as_str();
    let len = kw.chars().count();
    if len < 2 || len > HOT_KEY_MAX_LENGTH {
        return false;
    }

    static RE_SPAM: once_cell::sync::OnceCell<Vec<regex::Regex>> =
        once_cell::sync::OnceCell::new();
    let patterns = RE_SPAM.get_or_init(|| {
        vec![
            regex::Regex::new(r"^[\d\s]+$").unwrap(),
            regex::Regex::new(r"^[^\w]+$").unwrap(),
            regex::Regex::new(r"^\s*$").unwrap(),
        ]
    });
    !patterns.iter().any(|re| re.is_match(kw))
}

/// Collapse, rank, and cap the merged adapter output.
///
/// 1. Drop invalid signals.
/// 2. Score the rest.
/// 3. Group by `DedupKey`, keeping the strictly higher-scoring signal per
///    group (first seen wins exact ties) in first-seen order.
/// 4. Stable sort by score descending.
/// 5. Truncate to `top_n`.
///
/// Never errors; degenerate input yields an empty output.
pub fn reduce(signals: Vec<RawSignal>, top_n: usize) -> Vec<ScoredSignal> {
    let total = signals.len();

    let mut by_key: HashMap<DedupKey, usize> = HashMap::new();
    let mut kept: Vec<ScoredSignal> = Vec::with_capacity(signals.len());
    let mut dropped = 0usize;
    let mut collapsed = 0usize;

    for signal in signals {
        if !is_valid_signal(&signal) {
            dropped += 1;
            continue;
        }
        let key = DedupKey::new(signal.area, &signal.keyword);
        let quality_score = score::score(&signal);
        match by_key.get(&key) {
            Some(&idx) => {
                collapsed += 1;
                if quality_score > kept[idx].quality_score {
                    kept[idx] = ScoredSignal {
                        signal,
                        quality_score,
                    };
                }
            }
            None => {
                by_key.insert(key, kept.len());
                kept.push(ScoredSignal {
                    signal,
                    quality_score,
                });
            }
        }
    }

    // Vec::sort_by is stable, so equal scores keep first-seen order.
    kept.sort_by(|a, b| b.quality_score.cmp(&a.quality_score));
    kept.truncate(top_n);

    tracing::debug!(
        total,
        dropped,
        collapsed,
        retained = kept.len(),
        "reduce pass finished"
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AreaTag, SourceTag};

    fn sig(keyword: &str, area: AreaTag, source: SourceTag) -> RawSignal {
        RawSignal::new(keyword, area, source)
    }

    #[test]
    fn spam_keywords_are_dropped() {
        for bad in ["12345", "12 34 5", "!!!###", "   ", "x"] {
            let out = reduce(vec![sig(bad, AreaTag::Global, SourceTag::SearchTrends)], 10);
            assert!(out.is_empty(), "expected {bad:?} to be filtered");
        }
    }

    #[test]
    fn overlong_keyword_is_dropped() {
        let long = "x".repeat(HOT_KEY_MAX_LENGTH + 1);
        let out = reduce(vec![sig(&long, AreaTag::Global, SourceTag::SearchTrends)], 10);
        assert!(out.is_empty());
    }

    #[test]
    fn same_topic_across_sources_collapses_to_higher_trust() {
        let signals = vec![
            sig(
                "chatgpt updates",
                AreaTag::UnitedStates,
                SourceTag::SocialTrends,
            ),
            sig(
                "ChatGPT Updates",
                AreaTag::UnitedStates,
                SourceTag::SearchTrends,
            ),
        ];
        let out = reduce(signals, 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].signal.source, SourceTag::SearchTrends);
    }

    #[test]
    fn exact_tie_keeps_first_seen() {
        let signals = vec![
            sig("same topic here", AreaTag::Global, SourceTag::SocialTrends),
            sig("Same Topic! Here", AreaTag::Global, SourceTag::SocialTrends),
        ];
        let out = reduce(signals, 10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].signal.keyword, "same topic here");
    }

    #[test]
    fn different_areas_never_collapse() {
        let signals = vec![
            sig("world cup final", AreaTag::Europe, SourceTag::SearchTrends),
            sig(
                "world cup final",
                AreaTag::SouthAmerica,
                SourceTag::SearchTrends,
            ),
        ];
        assert_eq!(reduce(signals, 10).len(), 2);
    }

    #[test]
    fn output_is_ranked_and_capped() {
        let signals = vec![
            sig("ab", AreaTag::Global, SourceTag::Other),
            sig("a much longer keyword", AreaTag::Global, SourceTag::SearchTrends),
            sig("medium one", AreaTag::Global, SourceTag::SocialTrends),
        ];
        let out = reduce(signals.clone(), 2);
        assert_eq!(out.len(), 2);
        assert!(out[0].quality_score >= out[1].quality_score);
        assert_eq!(out[0].signal.keyword, "a much longer keyword");

        let all = reduce(signals, 100);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(reduce(Vec::new(), 10).is_empty());
        assert!(reduce(Vec::new(), 0).is_empty());
    }
}
