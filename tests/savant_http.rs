// HTTP tests for the catalog client and the animation probe.
//
// A local wiremock server stands in for the catalog and media origin.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use playclip::followup::{AnimationResolver, CatalogSource};
use playclip::savant::animation::AnimationFetcher;
use playclip::savant::client::SavantClient;
use playclip::savant::models::CandidateAsset;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
}

fn candidate(asset_id: &str) -> CandidateAsset {
    CandidateAsset {
        asset_id: asset_id.to_string(),
        inning: 6,
        batter_name: "Pete Alonso".to_string(),
        batter_id: Some(624413),
        description: String::new(),
        event: "home_run".to_string(),
        contact: true,
    }
}

#[tokio::test]
async fn catalog_feed_is_converted_to_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gf"))
        .and(query_param("game_pk", "777483"))
        .and(query_param("at_bat_number", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "team_home": [
                {"play_id": "home-1", "inning": 6, "batter_name": "Pete Alonso", "batter": 624413,
                 "des": "Pete Alonso homers (20).", "events": "home_run",
                 "pitch_call": "hit_into_play", "call": "X"}
            ],
            "team_away": [
                {"play_id": "away-1", "inning": "2", "batter_name": "Juan Soto",
                 "pitch_call": "called_strike", "call": "S"},
                {"inning": 3, "batter_name": "No Play Id"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SavantClient::new(&server.uri()).unwrap();
    let candidates = client.candidates(777483, date()).await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].asset_id, "home-1");
    assert!(candidates[0].contact);
    assert_eq!(candidates[0].batter_id, Some(624413));
    assert_eq!(candidates[1].asset_id, "away-1");
    assert_eq!(candidates[1].inning, 2);
    assert!(!candidates[1].contact);
}

#[tokio::test]
async fn empty_feed_yields_no_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = SavantClient::new(&server.uri()).unwrap();
    assert!(client.candidates(1, date()).await.unwrap().is_empty());
}

#[tokio::test]
async fn catalog_error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gf"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SavantClient::new(&server.uri()).unwrap();
    let err = client.candidates(1, date()).await.unwrap_err();
    assert!(err.to_string().contains("503"), "{err}");
}

#[tokio::test]
async fn probe_success_resolves_to_media_url() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/sporty-videos/webm/abc.webm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = AnimationFetcher::new(&server.uri()).unwrap();
    let url = fetcher.resolve(&candidate("abc")).await;
    assert_eq!(
        url,
        Some(format!("{}/sporty-videos/webm/abc.webm", server.uri()))
    );
}

#[tokio::test]
async fn missing_media_is_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = AnimationFetcher::new(&server.uri()).unwrap();
    assert_eq!(fetcher.resolve(&candidate("abc")).await, None);
}

#[tokio::test]
async fn slow_probe_is_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let fetcher =
        AnimationFetcher::with_timeout(&server.uri(), Duration::from_millis(200)).unwrap();
    assert_eq!(fetcher.resolve(&candidate("abc")).await, None);
}

#[tokio::test]
async fn unreachable_origin_is_not_available() {
    // Nothing listens on port 9 on a test machine.
    let fetcher = AnimationFetcher::new("http://127.0.0.1:9").unwrap();
    assert!(!fetcher.probe("http://127.0.0.1:9/sporty-videos/webm/x.webm").await);
}
