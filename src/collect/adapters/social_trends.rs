// src/collect/adapters/social_trends.rs
// Social-media trends upstream, polled per WOEID (where-on-earth id).

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::collect::adapters::{keyword_summary, SourceAdapter};
use crate::config::SocialTrendsConfig;
use crate::model::{AreaTag, AuxMetrics, RawSignal, SourceTag};

#[derive(Debug, Deserialize)]
struct TrendsResponse {
    #[serde(default)]
    data: Vec<TrendItem>,
}

#[derive(Debug, Deserialize)]
struct TrendItem {
    #[serde(alias = "trend_name")]
    trend: Option<String>,
    tweet_volume: Option<i64>,
    url: Option<String>,
}

pub struct SocialTrendsAdapter {
    mode: Mode,
    woeids: Vec<String>,
}

enum Mode {
    Fixture { woeid: String, body: String },
    Http {
        base_url: String,
        bearer_token: String,
        client: reqwest::Client,
    },
}

impl SocialTrendsAdapter {
    pub fn from_config(cfg: &SocialTrendsConfig, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                base_url: cfg.base_url.trim_end_matches('/').to_string(),
                bearer_token: cfg.bearer_token.clone(),
                client,
            },
            woeids: cfg.woeids.clone(),
        }
    }

    pub fn from_fixture(woeid: &str, body: &str) -> Self {
        Self {
            mode: Mode::Fixture {
                woeid: woeid.to_string(),
                body: body.to_string(),
            },
            woeids: vec![woeid.to_string()],
        }
    }

    fn parse_payload(woeid: &str, body: &str) -> Result<Vec<RawSignal>> {
        let resp: TrendsResponse =
            serde_json::from_str(body).context("parsing social trends payload")?;
        let area = area_from_woeid(woeid);

        let mut out = Vec::new();
        for item in resp.data {
            let Some(keyword) = item.trend.filter(|t| !t.is_empty()) else {
                continue;
            };
            let summary = keyword_summary(&keyword, 2, 5, false);
            let mut signal = RawSignal::new(keyword, area, SourceTag::SocialTrends);
            signal.description = (!summary.is_empty()).then_some(summary);
            signal.aux = AuxMetrics {
                volume: item.tweet_volume,
                url: item.url,
                ..AuxMetrics::default()
            };
            out.push(signal);
        }
        Ok(out)
    }

    async fn fetch_woeid(&self, woeid: &str) -> Result<Vec<RawSignal>> {
        match &self.mode {
            Mode::Fixture { woeid: fw, body } => Self::parse_payload(fw, body),
            Mode::Http {
                base_url,
                bearer_token,
                client,
            } => {
                let url = format!("{base_url}/2/trends/by/woeid/{woeid}");
                let body = client
                    .get(&url)
                    .bearer_auth(bearer_token)
                    .send()
                    .await
                    .context("social trends get()")?
                    .error_for_status()
                    .context("social trends status")?
                    .text()
                    .await
                    .context("social trends body")?;
                Self::parse_payload(woeid, &body)
            }
        }
    }

    fn has_credentials(&self) -> bool {
        match &self.mode {
            Mode::Fixture { .. } => true,
            Mode::Http { bearer_token, .. } => !bearer_token.is_empty(),
        }
    }
}

#[async_trait]
impl SourceAdapter for SocialTrendsAdapter {
    async fn fetch(&self) -> Result<Vec<RawSignal>> {
        if !self.has_credentials() {
            tracing::warn!("social trends bearer token not configured, skipping fetch");
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for woeid in &self.woeids {
            match self.fetch_woeid(woeid).await {
                Ok(mut signals) => out.append(&mut signals),
                Err(e) => tracing::warn!(error = %e, woeid = %woeid, "social trends woeid failed"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "social_trends"
    }
}

fn area_from_woeid(woeid: &str) -> AreaTag {
    match woeid {
        "1" => AreaTag::Global,
        "23424977" => AreaTag::UnitedStates,
        "2151330" => AreaTag::China,
        _ => AreaTag::Global,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trends_with_volume_and_url() {
        let body = r##"{"data":[
            {"trend_name":"#RustLang","tweet_volume":120000,"url":"https://t.example/rust"},
            {"trend_name":"World Cup Final","tweet_volume":null,"url":null}
        ]}"##;
        let signals = SocialTrendsAdapter::parse_payload("1", body).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].keyword, "#RustLang");
        assert_eq!(signals[0].area, AreaTag::Global);
        assert_eq!(signals[0].aux.volume, Some(120000));
        assert_eq!(signals[1].aux.volume, None);
        assert_eq!(signals[1].description.as_deref(), Some("world, cup, final"));
    }

    #[test]
    fn empty_or_missing_trend_names_are_skipped() {
        let body = r#"{"data":[{"tweet_volume":5},{"trend_name":""}]}"#;
        let signals = SocialTrendsAdapter::parse_payload("1", body).unwrap();
        assert!(signals.is_empty());
    }

    #[tokio::test]
    async fn missing_token_yields_empty_result_not_error() {
        let cfg = SocialTrendsConfig::default(); // empty bearer token
        let adapter = SocialTrendsAdapter::from_config(&cfg, reqwest::Client::new());
        let out = adapter.fetch().await.unwrap();
        assert!(out.is_empty());
    }
}
