// src/model.rs
// Common data shapes shared by the collect pipeline and storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Max stored length of a hot keyword (chars).
pub const HOT_KEY_MAX_LENGTH: usize = 100;
/// Max stored length of a hot keyword description (chars).
pub const HOT_KEY_DESC_MAX_LENGTH: usize = 500;
/// How many ranked entries survive one pipeline run.
pub const DEFAULT_TOP_N: usize = 50;
/// Rows whose `updated_at` is older than this are swept.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;
/// Upstream fetch / token exchange timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Coarse geographic/logical bucket for a trending topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaTag {
    Global,
    UnitedStates,
    China,
    Europe,
    Asia,
    Africa,
    Oceania,
    SouthAmerica,
}

impl Default for AreaTag {
    fn default() -> Self {
        AreaTag::Global
    }
}

impl AreaTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaTag::Global => "global",
            AreaTag::UnitedStates => "united_states",
            AreaTag::China => "china",
            AreaTag::Europe => "europe",
            AreaTag::Asia => "asia",
            AreaTag::Africa => "africa",
            AreaTag::Oceania => "oceania",
            AreaTag::SouthAmerica => "south_america",
        }
    }

    /// Parse the snake_case form used in query strings and config files.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Some(AreaTag::Global),
            "united_states" => Some(AreaTag::UnitedStates),
            "china" => Some(AreaTag::China),
            "europe" => Some(AreaTag::Europe),
            "asia" => Some(AreaTag::Asia),
            "africa" => Some(AreaTag::Africa),
            "oceania" => Some(AreaTag::Oceania),
            "south_america" => Some(AreaTag::SouthAmerica),
            _ => None,
        }
    }
}

impl std::fmt::Display for AreaTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which upstream produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    SocialTrends,
    LinkAggregator,
    SearchTrends,
    #[serde(other)]
    Other,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::SocialTrends => "social_trends",
            SourceTag::LinkAggregator => "link_aggregator",
            SourceTag::SearchTrends => "search_trends",
            SourceTag::Other => "other",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional signal-specific metadata. Used only for scoring, never identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxMetrics {
    pub numeric_score: Option<i64>,
    pub volume: Option<i64>,
    pub traffic: Option<String>,
    pub url: Option<String>,
}

/// One item as emitted by a source adapter, before scoring/dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSignal {
    pub keyword: String,
    pub description: Option<String>,
    pub area: AreaTag,
    pub source: SourceTag,
    #[serde(default)]
    pub aux: AuxMetrics,
    pub collected_at: DateTime<Utc>,
}

impl RawSignal {
    pub fn new(keyword: impl Into<String>, area: AreaTag, source: SourceTag) -> Self {
        Self {
            keyword: keyword.into(),
            description: None,
            area,
            source,
            aux: AuxMetrics::default(),
            collected_at: Utc::now(),
        }
    }
}

/// A `RawSignal` plus its computed quality score. Recomputed every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSignal {
    pub signal: RawSignal,
    pub quality_score: i32,
}

/// The durable row: one distinct trending topic per area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotKeyRecord {
    pub id: i64,
    pub area: AreaTag,
    pub hot_key: String,
    pub hot_key_desc: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Truncate to `max` chars, marking longer inputs with a trailing ellipsis.
pub fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text_intact() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello", 5), "hello");
    }

    #[test]
    fn truncate_marks_long_text() {
        let out = truncate_text("abcdefghij", 8);
        assert_eq!(out, "abcde...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn area_roundtrips_through_parse() {
        for a in [
            AreaTag::Global,
            AreaTag::UnitedStates,
            AreaTag::China,
            AreaTag::Europe,
            AreaTag::Asia,
            AreaTag::Africa,
            AreaTag::Oceania,
            AreaTag::SouthAmerica,
        ] {
            assert_eq!(AreaTag::parse(a.as_str()), Some(a));
        }
        assert_eq!(AreaTag::parse("atlantis"), None);
    }
}
