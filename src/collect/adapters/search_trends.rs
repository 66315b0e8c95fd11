// src/collect/adapters/search_trends.rs
// Daily search-trends upstream: one request per configured geo code.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::collect::adapters::{keyword_summary, SourceAdapter};
use crate::config::SearchTrendsConfig;
use crate::model::{AreaTag, AuxMetrics, RawSignal, SourceTag};

#[derive(Debug, Deserialize)]
struct TrendsEnvelope {
    #[serde(rename = "default")]
    default_block: TrendsDefault,
}

#[derive(Debug, Deserialize)]
struct TrendsDefault {
    #[serde(rename = "trendingSearchesDays", default)]
    days: Vec<TrendsDay>,
}

#[derive(Debug, Deserialize)]
struct TrendsDay {
    #[serde(rename = "trendingSearches", default)]
    searches: Vec<TrendingSearch>,
}

#[derive(Debug, Deserialize)]
struct TrendingSearch {
    title: Option<TrendTitle>,
    #[serde(rename = "formattedTraffic")]
    formatted_traffic: Option<String>,
    #[serde(default)]
    articles: Vec<TrendArticle>,
}

#[derive(Debug, Deserialize)]
struct TrendTitle {
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendArticle {
    url: Option<String>,
}

pub struct SearchTrendsAdapter {
    mode: Mode,
    geos: Vec<String>,
    pacing_millis: u64,
}

enum Mode {
    /// One geo's payload, verbatim. Used by tests.
    Fixture { geo: String, body: String },
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

impl SearchTrendsAdapter {
    pub fn from_config(cfg: &SearchTrendsConfig, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                client,
            },
            geos: cfg.geos.clone(),
            pacing_millis: cfg.pacing_millis,
        }
    }

    pub fn from_fixture(geo: &str, body: &str) -> Self {
        Self {
            mode: Mode::Fixture {
                geo: geo.to_string(),
                body: body.to_string(),
            },
            geos: vec![geo.to_string()],
            pacing_millis: 0,
        }
    }

    fn parse_payload(geo: &str, body: &str) -> Result<Vec<RawSignal>> {
        // The upstream prefixes its JSON with an anti-hijacking marker.
        let json = body.trim_start().trim_start_matches(")]}',").trim_start();
        let envelope: TrendsEnvelope =
            serde_json::from_str(json).context("parsing search trends payload")?;

        let area = area_from_geo(geo);
        let mut out = Vec::new();
        for day in envelope.default_block.days.into_iter().take(1) {
            for item in day.searches {
                let Some(keyword) = item.title.and_then(|t| t.query).filter(|q| !q.is_empty())
                else {
                    continue;
                };
                let traffic = item.formatted_traffic.clone();
                let summary = keyword_summary(&keyword, 2, 3, false);
                let description = match &traffic {
                    Some(t) if !summary.is_empty() => Some(format!("{summary} ({t})")),
                    _ if !summary.is_empty() => Some(summary),
                    _ => None,
                };
                let mut signal = RawSignal::new(keyword, area, SourceTag::SearchTrends);
                signal.description = description;
                signal.aux = AuxMetrics {
                    traffic,
                    url: item.articles.into_iter().find_map(|a| a.url),
                    ..AuxMetrics::default()
                };
                out.push(signal);
            }
        }
        Ok(out)
    }

    async fn fetch_geo(&self, geo: &str) -> Result<Vec<RawSignal>> {
        match &self.mode {
            Mode::Fixture { geo: fg, body } => Self::parse_payload(fg, body),
            Mode::Http { base_url, client } => {
                let url = format!("{base_url}/trends/api/dailytrends");
                let body = client
                    .get(&url)
                    .query(&[("geo", geo), ("hl", "en-US")])
                    .send()
                    .await
                    .context("search trends get()")?
                    .error_for_status()
                    .context("search trends status")?
                    .text()
                    .await
                    .context("search trends body")?;
                Self::parse_payload(geo, &body)
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for SearchTrendsAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        let mut out = Vec::new();
        for (i, geo) in self.geos.iter().enumerate() {
            if i > 0 && self.pacing_millis > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(self.pacing_millis)).await;
            }
            match self.fetch_geo(geo).await {
                Ok(mut signals) => out.append(&mut signals),
                // One bad geo must not poison the others.
                Err(e) => tracing::warn!(error = %e, geo = %geo, "search trends geo failed"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "search_trends"
    }
}

fn area_from_geo(geo: &str) -> AreaTag {
    match geo.to_ascii_uppercase().as_str() {
        "US" => AreaTag::UnitedStates,
        "CN" => AreaTag::China,
        "GB" | "DE" | "FR" => AreaTag::Europe,
        "JP" | "IN" => AreaTag::Asia,
        "AU" => AreaTag::Oceania,
        "BR" => AreaTag::SouthAmerica,
        "ZA" => AreaTag::Africa,
        _ => AreaTag::Global,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_mapping_defaults_to_global() {
        assert_eq!(area_from_geo("us"), AreaTag::UnitedStates);
        assert_eq!(area_from_geo("DE"), AreaTag::Europe);
        assert_eq!(area_from_geo("XX"), AreaTag::Global);
    }

    #[test]
    fn parses_prefixed_payload() {
        let body = r#")]}',
{"default":{"trendingSearchesDays":[{"trendingSearches":[
  {"title":{"query":"ChatGPT Updates"},"formattedTraffic":"200K+",
   "articles":[{"url":"https://news.example/a"}]}
]}]}}"#;
        let signals = SearchTrendsAdapter::parse_payload("US", body).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].keyword, "ChatGPT Updates");
        assert_eq!(signals[0].area, AreaTag::UnitedStates);
        assert_eq!(signals[0].source, SourceTag::SearchTrends);
        assert_eq!(signals[0].aux.traffic.as_deref(), Some("200K+"));
        assert_eq!(signals[0].aux.url.as_deref(), Some("https://news.example/a"));
        assert_eq!(
            signals[0].description.as_deref(),
            Some("chatgpt, updates (200K+)")
        );
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        assert!(SearchTrendsAdapter::parse_payload("US", "not json").is_err());
    }

    #[test]
    fn entries_without_a_query_are_skipped() {
        let body = r#"{"default":{"trendingSearchesDays":[{"trendingSearches":[
            {"title":{},"formattedTraffic":"1K+"},
            {"title":{"query":""}}
        ]}]}}"#;
        let signals = SearchTrendsAdapter::parse_payload("US", body).unwrap();
        assert!(signals.is_empty());
    }
}
