// src/collect/score.rs
// Additive quality heuristic. Exists to produce a stable total order for
// ranking, not to be statistically meaningful.

use crate::model::{RawSignal, SourceTag};

/// Trust weight per upstream. Unknown origins score lowest.
fn source_trust(source: SourceTag) -> i32 {
    match source {
        SourceTag::SearchTrends => 4,
        SourceTag::SocialTrends => 3,
        SourceTag::LinkAggregator => 2,
        SourceTag::Other => 1,
    }
}

/// Compute the quality score for one signal. Each condition contributes
/// independently; no signal short-circuits another.
pub fn score(signal: &RawSignal) -> i32 {
    let mut score = 0;

    let kw_len = signal.keyword.chars().count();
    if kw_len > 5 {
        score += 2;
    }
    if kw_len > 10 {
        score += 1;
    }

    if let Some(desc) = &signal.description {
        let desc_len = desc.chars().count();
        if desc_len > 10 {
            score += 3;
        }
        if desc_len > 30 {
            score += 2;
        }
    }

    score += source_trust(signal.source);

    if signal.aux.numeric_score.is_some()
        || signal.aux.volume.is_some()
        || signal.aux.traffic.is_some()
    {
        score += 1;
    }

    if signal.aux.url.as_deref().is_some_and(is_http_url) {
        score += 1;
    }

    score
}

/// Well-formed http(s) URL check. Anything else earns no points.
fn is_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(u) => matches!(u.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
