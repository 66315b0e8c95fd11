// src/collect/adapters/link_aggregator.rs
// Link-aggregator "hot posts" upstream. Needs a bearer token from the OAuth
// collaborator; without one it degrades to an empty fetch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::collect::adapters::{keyword_summary, SourceAdapter};
use crate::config::LinkAggregatorConfig;
use crate::model::{AreaTag, AuxMetrics, RawSignal, SourceTag};
use crate::oauth::TokenProvider;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    #[serde(default)]
    selftext: String,
    score: Option<i64>,
    permalink: Option<String>,
}

pub struct LinkAggregatorAdapter {
    mode: Mode,
    tokens: Arc<dyn TokenProvider>,
    communities: Vec<String>,
    per_community_limit: usize,
}

enum Mode {
    Fixture { community: String, body: String },
    Http {
        base_url: String,
        user_agent: String,
        client: reqwest::Client,
    },
}

impl LinkAggregatorAdapter {
    pub fn from_config(
        cfg: &LinkAggregatorConfig,
        client: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            mode: Mode::Http {
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                user_agent: cfg.user_agent.clone(),
                client,
            },
            tokens,
            communities: cfg.communities.clone(),
            per_community_limit: cfg.per_community_limit,
        }
    }

    pub fn from_fixture(community: &str, body: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            mode: Mode::Fixture {
                community: community.to_string(),
                body: body.to_string(),
            },
            tokens,
            communities: vec![community.to_string()],
            per_community_limit: 5,
        }
    }

    fn parse_payload(community: &str, body: &str) -> Result<Vec<RawSignal>> {
        let listing: Listing =
            serde_json::from_str(body).context("parsing hot posts listing")?;
        let area = area_from_community(community);

        let mut out = Vec::new();
        for post in listing.data.children {
            let d = post.data;
            let Some(title) = d.title.filter(|t| !t.is_empty()) else {
                continue;
            };
            let combined = format!("{} {}", title, d.selftext);
            let summary = keyword_summary(&combined, 3, 5, true);
            let mut signal = RawSignal::new(title, area, SourceTag::LinkAggregator);
            signal.description = (!summary.is_empty()).then_some(summary);
            signal.aux = AuxMetrics {
                numeric_score: d.score,
                url: d
                    .permalink
                    .map(|p| format!("https://reddit.com{p}")),
                ..AuxMetrics::default()
            };
            out.push(signal);
        }
        Ok(out)
    }

    async fn fetch_community(&self, community: &str, token: &str) -> Result<Vec<RawSignal>> {
        match &self.mode {
            Mode::Fixture { community: fc, body } => Self::parse_payload(fc, body),
            Mode::Http {
                base_url,
                user_agent,
                client,
            } => {
                let url = format!("{base_url}/r/{community}/hot");
                let body = client
                    .get(&url)
                    .bearer_auth(token)
                    .header(reqwest::header::USER_AGENT, user_agent)
                    .query(&[
                        ("limit", self.per_community_limit.to_string()),
                        ("raw_json", "1".to_string()),
                    ])
                    .send()
                    .await
                    .context("hot posts get()")?
                    .error_for_status()
                    .context("hot posts status")?
                    .text()
                    .await
                    .context("hot posts body")?;
                Self::parse_payload(community, &body)
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for LinkAggregatorAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        let Some(token) = self.tokens.get_token().await else {
            tracing::warn!("no bearer token available, skipping link aggregator fetch");
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for community in &self.communities {
            match self.fetch_community(community, &token).await {
                Ok(mut signals) => out.append(&mut signals),
                Err(e) => {
                    tracing::warn!(error = %e, community = %community, "hot posts fetch failed")
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "link_aggregator"
    }
}

fn area_from_community(community: &str) -> AreaTag {
    match community.to_ascii_lowercase().as_str() {
        "popular" | "worldnews" => AreaTag::Global,
        "news" => AreaTag::UnitedStates,
        "europe" => AreaTag::Europe,
        "asia" => AreaTag::Asia,
        "china" => AreaTag::China,
        _ => AreaTag::Global,
    }
}
