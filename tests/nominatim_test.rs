//! Integration tests for NominatimClient using wiremock

use coverage_checker::config::GeocoderConfig;
use coverage_checker::geocoder::{Geocoder, NominatimClient};
use coverage_checker::utils::error::GeocodeError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> NominatimClient {
    let config = GeocoderConfig {
        base_url: server.uri(),
        user_agent: "coverage-checker-test/1.0".to_string(),
        requests_per_second: 50,
        request_timeout_secs: 5,
        max_retries,
        ..Default::default()
    };
    NominatimClient::new(&config).unwrap()
}

fn places() -> serde_json::Value {
    json!([
        {
            "place_id": 1,
            "display_name": "Kiganjo, Thika, Kiambu, Kenya",
            "lat": "-1.0380",
            "lon": "37.0750",
            "type": "suburb"
        },
        {
            "place_id": 2,
            "display_name": "Kiganjo Road, Thika, Kenya",
            "lat": "-1.0402",
            "lon": "37.0771"
        }
    ])
}

/// Test that the query carries the region bias and the expected parameters
#[tokio::test]
async fn test_search_sends_biased_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "Kiganjo, Thika, Kenya"))
        .and(query_param("limit", "5"))
        .and(header("user-agent", "coverage-checker-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places()))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server, 0).search("  Kiganjo ", 5).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].display_name, "Kiganjo, Thika, Kiambu, Kenya");
    assert_eq!(results[0].lat, -1.038);
    assert_eq!(results[1].lon, 37.0771);
}

/// Test locate takes the first candidate only
#[tokio::test]
async fn test_locate_requests_single_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Makongeni, Thika", "lat": "-1.048", "lon": "37.084" }
        ])))
        .mount(&server)
        .await;

    let hit = client(&server, 0).locate("Makongeni").await.unwrap().unwrap();
    assert_eq!(hit.display_name, "Makongeni, Thika");
}

/// Test an empty result list
#[tokio::test]
async fn test_no_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client(&server, 0);
    assert!(client.search("Atlantis", 5).await.unwrap().is_empty());
    assert!(client.locate("Atlantis").await.unwrap().is_none());
}

/// Test that server errors trigger retries
#[tokio::test]
async fn test_server_error_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(places()))
        .mount(&server)
        .await;

    let result = client(&server, 2).search("Kiganjo", 5).await;
    assert!(result.is_ok(), "Should succeed after retry: {:?}", result.err());
}

/// Test 404 does not retry
#[tokio::test]
async fn test_404_no_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, 3).search("Kiganjo", 5).await;
    assert!(matches!(result, Err(GeocodeError::ServerError(404))));
}

/// Test rate limit responses are retried and eventually reported
#[tokio::test]
async fn test_rate_limited_gives_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let result = client(&server, 1).search("Kiganjo", 5).await;
    assert!(result.is_err());
}

/// Test a malformed coordinate drops only that row
#[tokio::test]
async fn test_invalid_coordinate_row_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Broken", "lat": "", "lon": "37.0" },
            { "display_name": "Kiganjo, Thika, Kenya", "lat": "-1.0396", "lon": "37.0700" }
        ])))
        .mount(&server)
        .await;

    let results = client(&server, 0).search("Kiganjo", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].display_name, "Kiganjo, Thika, Kenya");
    assert_eq!(results[0].lat, -1.0396);
}

/// Test a response with only malformed rows yields no suggestions
#[tokio::test]
async fn test_all_invalid_coordinates_yield_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Broken", "lat": "north", "lon": "37.0" }
        ])))
        .mount(&server)
        .await;

    let results = client(&server, 0).search("Broken", 5).await.unwrap();
    assert!(results.is_empty());
}

/// Test a body that is not a result list
#[tokio::test]
async fn test_invalid_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client(&server, 0).search("Kiganjo", 5).await;
    assert!(matches!(result, Err(GeocodeError::InvalidResponse(_))));
}
