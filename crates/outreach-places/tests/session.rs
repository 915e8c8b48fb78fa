//! Integration tests for `SearchSession` driving a wiremock-backed client.

use std::time::Duration;

use outreach_core::{AppConfig, Country, PlaceId, Radius};
use outreach_places::session::{
    MSG_CITY_REQUIRED, MSG_DETAILS_FAILED, MSG_NO_RESULTS, MSG_SEARCH_COMPLETED,
    MSG_SEARCH_FAILED, MSG_SEARCH_IN_PROGRESS,
};
use outreach_places::{NoticeLevel, PlacesClient, SearchSession};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NEARBY: &str = "/accounts/get-local-nearby-v2/";
const DETAILS: &str = "/accounts/get-details-list-stage1/";

fn test_client(server: &MockServer) -> PlacesClient {
    let config = AppConfig {
        directory_base_url: server.uri(),
        places_base_url: server.uri(),
        directory_api_key: "dir-key".to_string(),
        places_api_key: "places-key".to_string(),
        request_timeout_secs: 5,
        user_agent: "outreach-test/0.1".to_string(),
        log_level: "info".to_string(),
    };
    PlacesClient::new(&config).expect("client construction should not fail")
}

async fn mount_cities(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/get-coords-v3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "header": true },
                { "name": "Accra", "lat": 5.6, "lon": -0.2 },
                { "name": "Tema", "lat": 5.7, "lon": 0.0 }
            ]
        })))
        .mount(server)
        .await;
}

/// Session with Ghana selected, Accra chosen, and a 1 km radius.
async fn session_in_accra(client: &PlacesClient) -> SearchSession {
    let mut session = SearchSession::new();
    session.select_country(client, Country::new("Ghana")).await;
    session.select_city("Accra").expect("Accra is in the list");
    session.set_radius(Radius::from_km(1.0).unwrap());
    session.set_query("hotel");
    session.drain_notices();
    session
}

#[tokio::test]
async fn load_countries_populates_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-countries-v3/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "countries": ["Ghana"] } ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = SearchSession::new();
    session.load_countries(&client).await;

    assert_eq!(session.countries(), &[Country::new("Ghana")]);
    assert!(!session.is_loading_countries());
    assert_eq!(session.drain_notices()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn load_countries_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-countries-v3/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = SearchSession::new();
    session.load_countries(&client).await;

    assert!(session.countries().is_empty());
    assert_eq!(session.error(), Some("Failed to load countries."));
    assert!(!session.is_loading_countries());
}

#[tokio::test]
async fn select_country_loads_cities() {
    let server = MockServer::start().await;
    mount_cities(&server).await;

    let client = test_client(&server);
    let mut session = SearchSession::new();
    session.select_country(&client, Country::new("Ghana")).await;

    let names: Vec<&str> = session.cities().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Accra", "Tema"]);
    assert!(!session.is_loading_cities());
}

#[tokio::test]
async fn search_without_city_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = SearchSession::new();
    session.run_search(&client).await;

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, MSG_CITY_REQUIRED);
    assert!(!session.is_searching());
}

#[tokio::test]
async fn successful_search_stores_merged_results() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .and(body_partial_json(json!({ "radius1": 0, "radius2": 200 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": ["H1", "H2"] })),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": [] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DETAILS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succesful_results": [ { "placeId": "H1", "place_name": "Hotel One" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;

    let mut seen = 0;
    session
        .run_search_with_progress(&client, |_| seen += 1)
        .await;

    assert_eq!(seen, 11);
    assert_eq!(session.results().len(), 2);
    assert_eq!(session.results()[0].name(), Some("Hotel One"));
    assert_eq!(session.place_ids(), &[PlaceId::new("H1"), PlaceId::new("H2")]);
    assert!(session.error().is_none());
    assert!(!session.is_searching());
    assert_eq!(session.drain_notices()[0].message, MSG_SEARCH_COMPLETED);
}

#[tokio::test]
async fn empty_search_reports_no_results() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": [] })))
        .expect(5)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;
    session.run_search(&client).await;

    assert!(session.results().is_empty());
    assert!(session.error().is_none(), "no results is not an error");
    let notices = session.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Info);
    assert_eq!(notices[0].message, MSG_NO_RESULTS);
}

#[tokio::test]
async fn band_failure_keeps_earlier_identifiers_only() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .and(body_partial_json(json!({ "radius1": 0, "radius2": 200 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": ["A"] })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;
    session.run_search(&client).await;

    assert_eq!(session.place_ids(), &[PlaceId::new("A")]);
    assert!(session.results().is_empty());
    assert_eq!(session.error(), Some(MSG_SEARCH_FAILED));
}

#[tokio::test]
async fn details_failure_preserves_identifiers() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": ["Z"] })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(DETAILS))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;
    session.run_search(&client).await;

    assert_eq!(session.place_ids().len(), 5);
    assert!(session.results().is_empty());
    assert_eq!(session.error(), Some(MSG_DETAILS_FAILED));
}

#[tokio::test]
async fn rejected_limit_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let _client = test_client(&server);
    let mut session = SearchSession::new();
    assert!(!session.set_limit(100));
    assert_eq!(session.limit().value(), 20);
    assert_eq!(session.drain_notices()[0].level, NoticeLevel::Error);
}

/// First nearby request stalls long enough for the caller to give up on it.
async fn mount_stalled_first_band(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "place_id_list": ["slow"] }))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn dropped_search_does_not_block_the_next_one() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    mount_stalled_first_band(&server).await;
    Mock::given(method("POST"))
        .and(path(NEARBY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "place_id_list": [] })))
        .expect(5)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;

    let abandoned =
        tokio::time::timeout(Duration::from_millis(50), session.run_search(&client)).await;
    assert!(abandoned.is_err(), "first search should time out");
    assert!(!session.is_searching());

    session.run_search(&client).await;

    assert!(!session.is_searching());
    assert!(session.error().is_none());
    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, MSG_NO_RESULTS);
}

#[tokio::test]
async fn search_refused_while_one_is_running() {
    let server = MockServer::start().await;
    mount_cities(&server).await;
    mount_stalled_first_band(&server).await;

    let client = test_client(&server);
    let mut session = session_in_accra(&client).await;

    // Leak a search that has started but never finishes.
    let mut running = Box::pin(session.run_search(&client));
    let _ = tokio::time::timeout(Duration::from_millis(50), &mut running).await;
    std::mem::forget(running);

    assert!(session.is_searching());
    session.run_search(&client).await;

    let notices = session.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, MSG_SEARCH_IN_PROGRESS);
    let nearby_requests = server
        .received_requests()
        .await
        .expect("request recording is enabled")
        .iter()
        .filter(|r| r.url.path() == NEARBY)
        .count();
    assert_eq!(nearby_requests, 1, "refused search issues no request");
}
