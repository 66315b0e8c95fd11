// tests/adapters_fixture.rs
// Boundary coercion: each adapter maps its upstream payload into RawSignal,
// verified against embedded fixture payloads.

use std::sync::Arc;

use world_hotkeys::collect::adapters::{
    link_aggregator::LinkAggregatorAdapter, search_trends::SearchTrendsAdapter,
    social_trends::SocialTrendsAdapter, SourceAdapter,
};
use world_hotkeys::collect::reduce;
use world_hotkeys::model::{AreaTag, SourceTag};
use world_hotkeys::oauth::StaticToken;

const DAILY_TRENDS: &str = include_str!("fixtures/daily_trends.json");
const SOCIAL_TRENDS: &str = include_str!("fixtures/social_trends.json");
const HOT_POSTS: &str = include_str!("fixtures/hot_posts.json");

#[tokio::test]
async fn search_trends_fixture_maps_first_day_only() {
    let adapter = SearchTrendsAdapter::from_fixture("US", DAILY_TRENDS);
    let signals = adapter.fetch().await.unwrap();

    let keywords: Vec<&str> = signals.iter().map(|s| s.keyword.as_str()).collect();
    assert_eq!(
        keywords,
        vec!["ChatGPT Updates", "Climate Summit 2026", "iPhone 18 Release"]
    );
    assert!(signals.iter().all(|s| s.area == AreaTag::UnitedStates));
    assert!(signals.iter().all(|s| s.source == SourceTag::SearchTrends));
    assert_eq!(signals[0].aux.traffic.as_deref(), Some("500K+"));
    assert_eq!(
        signals[0].aux.url.as_deref(),
        Some("https://news.example/chatgpt-updates")
    );
    assert_eq!(signals[1].aux.url, None);
}

#[tokio::test]
async fn social_trends_fixture_keeps_volume_and_urls() {
    let adapter = SocialTrendsAdapter::from_fixture("1", SOCIAL_TRENDS);
    let signals = adapter.fetch().await.unwrap();

    assert_eq!(signals.len(), 4);
    assert!(signals.iter().all(|s| s.area == AreaTag::Global));
    assert_eq!(signals[0].aux.volume, Some(250000));
    assert_eq!(signals[3].aux.volume, None);
}

#[tokio::test]
async fn hot_posts_fixture_maps_posts_with_permalinks() {
    let adapter = LinkAggregatorAdapter::from_fixture(
        "technology",
        HOT_POSTS,
        Arc::new(StaticToken("tok".into())),
    );
    let signals = adapter.fetch().await.unwrap();

    assert_eq!(signals.len(), 3);
    assert!(signals.iter().all(|s| s.source == SourceTag::LinkAggregator));
    assert_eq!(signals[0].aux.numeric_score, Some(51200));
    assert_eq!(
        signals[0].aux.url.as_deref(),
        Some("https://reddit.com/r/technology/comments/abc123/")
    );
}

#[tokio::test]
async fn merged_fixture_output_survives_reduce_without_spam() {
    let search = SearchTrendsAdapter::from_fixture("US", DAILY_TRENDS);
    let social = SocialTrendsAdapter::from_fixture("1", SOCIAL_TRENDS);
    let posts = LinkAggregatorAdapter::from_fixture(
        "technology",
        HOT_POSTS,
        Arc::new(StaticToken("tok".into())),
    );

    let mut merged = search.fetch().await.unwrap();
    merged.extend(social.fetch().await.unwrap());
    merged.extend(posts.fetch().await.unwrap());
    let before = merged.len();

    let out = reduce(merged, 50);
    // Spam entries ("12345", "!!") are gone, everything else survives.
    assert_eq!(out.len(), before - 2);
    assert!(out
        .iter()
        .all(|s| !s.signal.keyword.chars().all(|c| c.is_ascii_digit())));
    // The US search trend, the global social trend, and the longer-titled
    // post normalize to different dedup keys, so all three survive.
    let chatgpt: Vec<_> = out
        .iter()
        .filter(|s| s.signal.keyword.to_lowercase().contains("chatgpt"))
        .collect();
    assert_eq!(chatgpt.len(), 3);
}
