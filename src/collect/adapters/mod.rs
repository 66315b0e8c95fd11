// src/collect/adapters/mod.rs
// One adapter per upstream. Each one validates/coerces its payload into
// `RawSignal` at the boundary and fails closed: a malformed or unreachable
// upstream contributes zero signals, never malformed data downstream.

pub mod link_aggregator;
pub mod search_trends;
pub mod social_trends;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::RawSignal;

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch the latest items from the upstream, already mapped to
    /// `RawSignal`. Errors are caught by the pipeline, never fatal.
    async fn fetch(&self) -> Result<Vec<RawSignal>>;
    fn name(&self) -> &'static str;
}

/// Short comma-joined keyword summary of free text, used as the signal
/// description when the upstream gives nothing better.
pub(crate) fn keyword_summary(
    text: &str,
    min_word_len: usize,
    max_words: usize,
    drop_stopwords: bool,
) -> String {
    const STOPWORDS: &[&str] = &[
        "the", "is", "at", "which", "on", "and", "a", "to", "are", "as", "was", "were", "been",
        "be", "have", "has", "had", "do", "does", "did", "will", "would", "should", "could",
        "can", "may", "might", "must", "shall", "of", "in", "for", "with", "by", "this", "that",
        "from", "about",
    ];

    static RE_NONWORD: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re = RE_NONWORD.get_or_init(|| regex::Regex::new(r"[^\w\s]").unwrap());

    let lowered = text.to_lowercase();
    let cleaned = re.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > min_word_len)
        .filter(|w| !drop_stopwords || !STOPWORDS.contains(w))
        .take(max_words)
        .collect::<Vec<_>>()
        .join(", ")
}
