//! Integration tests for the OpenSky-style flight source.

use mockito::Matcher;
use skywatch::{
    config::HttpRetryConfig,
    geo::BoundingBox,
    http_client::create_retryable_http_client,
    source::{FlightSource, SourceError, opensky::OpenSkySource},
    test_helpers::feed_row,
};
use url::Url;

fn jaipur_box() -> BoundingBox {
    BoundingBox::new(26.95, 26.87, 75.82, 75.74).unwrap()
}

fn source_for(server: &mockito::ServerGuard, retry: HttpRetryConfig) -> OpenSkySource {
    let client = create_retryable_http_client(&retry, reqwest::Client::new());
    OpenSkySource::new(Url::parse(&server.url()).unwrap(), client)
}

fn no_retries() -> HttpRetryConfig {
    HttpRetryConfig { max_retries: 0, ..Default::default() }
}

#[tokio::test]
async fn maps_the_box_to_feed_query_parameters() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("lamin".into(), "26.87".into()),
            Matcher::UrlEncoded("lamax".into(), "26.95".into()),
            Matcher::UrlEncoded("lomin".into(), "75.74".into()),
            Matcher::UrlEncoded("lomax".into(), "75.82".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"time": 1699999999, "states": null}"#)
        .create_async()
        .await;

    let source = source_for(&server, no_retries());
    let states = source.fetch_states(&jaipur_box()).await.unwrap();

    assert!(states.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn parses_states_and_drops_malformed_rows() {
    let mut server = mockito::Server::new_async().await;

    let body = serde_json::json!({
        "time": 1699999999,
        "states": [
            feed_row("800c42", "AIC442  ", 75.78, 26.90, false),
            // Too short to carry position and ground status.
            ["dead01", "SHORT"],
            // Null position is usable; the scheduler skips it later.
            [
                "beef02", "NOPOS", "India", 1699999999, 1699999999,
                null, null, null, false, null, null, null
            ],
        ],
    });

    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let source = source_for(&server, no_retries());
    let states = source.fetch_states(&jaipur_box()).await.unwrap();

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].aircraft_id, "800c42");
    assert_eq!(states[0].callsign.as_deref(), Some("AIC442"));
    assert_eq!(states[0].position(), Some((26.90, 75.78)));
    assert_eq!(states[1].aircraft_id, "beef02");
    assert_eq!(states[1].position(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_a_source_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let source = source_for(&server, no_retries());
    let result = source.fetch_states(&jaipur_box()).await;

    assert!(matches!(result, Err(SourceError::BadStatus(status)) if status.as_u16() == 404));
    mock.assert_async().await;
}

#[tokio::test]
async fn transient_server_errors_are_retried_before_giving_up() {
    let mut server = mockito::Server::new_async().await;

    // Fails on every attempt; with two retries the feed is hit three times.
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .expect(3)
        .create_async()
        .await;

    let retry = HttpRetryConfig { max_retries: 2, ..Default::default() };
    let source = source_for(&server, retry);
    let result = source.fetch_states(&jaipur_box()).await;

    assert!(matches!(result, Err(SourceError::BadStatus(status)) if status.as_u16() == 503));
    mock.assert_async().await;
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json at all")
        .create_async()
        .await;

    let source = source_for(&server, no_retries());
    let result = source.fetch_states(&jaipur_box()).await;

    assert!(matches!(result, Err(SourceError::Decode(_))));
    mock.assert_async().await;
}
