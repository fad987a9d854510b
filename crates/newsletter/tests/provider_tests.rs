//! HTTP-level tests for the search providers against a mock server.

use newsletter::error::SearchError;
use newsletter::search::{DuckDuckGoProvider, RapidApiProvider, SearchProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// RapidAPI
// =============================================================================

#[tokio::test]
async fn test_rapidapi_sends_key_and_parses_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "climate grant"))
        .and(query_param("num", "5"))
        .and(header("x-rapidapi-key", "test-key"))
        .and(header("x-rapidapi-host", "real-time-web-search.p.rapidapi.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "data": [
                {
                    "title": "Resilience Fund",
                    "url": "https://fund.org/apply",
                    "snippet": "Applications close May 1, 2027"
                },
                {
                    "name": "Older field names",
                    "link": "https://drift.org/page",
                    "description": "Same hit, renamed fields"
                },
                { "title": "No link at all" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = RapidApiProvider::with_base_url("test-key", server.uri()).unwrap();
    let results = provider.search("climate grant", 5).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Resilience Fund");
    assert_eq!(results[0].link, "https://fund.org/apply");
    assert_eq!(results[0].source, "rapidapi");
    assert_eq!(results[1].title, "Older field names");
    assert_eq!(results[1].link, "https://drift.org/page");
    assert_eq!(results[1].snippet, "Same hit, renamed fields");
}

#[tokio::test]
async fn test_rapidapi_missing_data_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK"
        })))
        .mount(&server)
        .await;

    let provider = RapidApiProvider::with_base_url("test-key", server.uri()).unwrap();
    let results = provider.search("anything", 5).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_rapidapi_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let provider = RapidApiProvider::with_base_url("test-key", server.uri()).unwrap();
    let err = provider.search("anything", 5).await.unwrap_err();

    match err {
        SearchError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rapidapi_without_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = RapidApiProvider::with_base_url("", server.uri()).unwrap();
    let err = provider.search("anything", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::NoApiKey("rapidapi")));
}

// =============================================================================
// DuckDuckGo
// =============================================================================

const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fclimate.org%2Fsummit&amp;rut=x">Climate Summit 2027</a>
    <a class="result__snippet">Join us on June 10, 2027 in Nairobi</a>
  </div>
  <div class="result">
    <a class="result__a" href="https://report.org/esg">ESG Report</a>
    <a class="result__snippet">Published: January 12, 2026</a>
  </div>
</body></html>
"#;

#[tokio::test]
async fn test_duckduckgo_parses_html_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "climate summit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::with_base_url(server.uri()).unwrap();
    let results = provider.search("climate summit", 10).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Climate Summit 2027");
    assert_eq!(results[0].link, "https://climate.org/summit");
    assert_eq!(results[0].snippet, "Join us on June 10, 2027 in Nairobi");
    assert_eq!(results[1].link, "https://report.org/esg");
}

#[tokio::test]
async fn test_duckduckgo_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::with_base_url(server.uri()).unwrap();
    let err = provider.search("climate summit", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::Api { status: 503, .. }));
}
