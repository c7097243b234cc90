mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use city_explorer::api::GENERIC_ERROR_BODY;
use city_explorer::clients::ExternalProviders;
use common::{FakeProviders, test_config};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app(providers: Arc<FakeProviders>) -> Router {
    let state = city_explorer::api::create_app_state_with_providers(
        test_config(),
        providers as Arc<dyn ExternalProviders>,
    )
    .await
    .expect("Failed to create app state");
    city_explorer::api::router(state).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> serde_json::Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "GET {uri} failed");
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_location_endpoint() {
    let providers = FakeProviders::seattle();
    let app = spawn_app(providers.clone()).await;

    let location = get_json(&app, "/location?data=Seattle").await;
    assert_eq!(location["search_query"], "Seattle");
    assert_eq!(location["formatted_query"], "Seattle, WA, USA");
    assert_eq!(location["latitude"], 47.6);
    assert_eq!(location["longitude"], -122.33);
    assert!(location["id"].as_i64().unwrap() > 0);

    let cached = get_json(&app, "/location?data=Seattle").await;
    assert_eq!(cached, location);
    assert_eq!(providers.calls().0, 1);
}

#[tokio::test]
async fn test_location_query_is_url_decoded() {
    let providers = FakeProviders::seattle();
    let app = spawn_app(providers).await;

    let location = get_json(&app, "/location?data=Seattle%2C%20WA").await;
    assert_eq!(location["search_query"], "Seattle, WA");
}

#[tokio::test]
async fn test_weather_endpoint() {
    let providers = FakeProviders::seattle();
    let app = spawn_app(providers.clone()).await;

    let location = get_json(&app, "/location?data=Seattle").await;
    let id = location["id"].as_i64().unwrap();

    let data = urlencoding::encode(&format!(
        r#"{{"id":{id},"latitude":47.6,"longitude":-122.33}}"#
    ))
    .into_owned();
    let forecast = get_json(&app, &format!("/weather?data={data}")).await;

    let days = forecast.as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["forecast"], "Light rain in the morning.");
    assert_eq!(days[0]["time"], "Mon Jan 15 2024");
    assert!(days.iter().all(|day| day["location_id"] == id));

    // Bracketed form parameters address the same rows.
    let bracketed = get_json(&app, &format!("/weather?data%5Bid%5D={id}")).await;
    assert_eq!(bracketed, forecast);
    assert_eq!(providers.calls().1, 1);
}

#[tokio::test]
async fn test_meetups_endpoint() {
    let providers = FakeProviders::seattle();
    let app = spawn_app(providers.clone()).await;

    let location = get_json(&app, "/location?data=Seattle").await;
    let id = location["id"].as_i64().unwrap();

    let data = urlencoding::encode(&format!(r#"{{"id":{id}}}"#)).into_owned();
    let meetups = get_json(&app, &format!("/meetups?data={data}")).await;

    let meetups = meetups.as_array().unwrap();
    assert_eq!(meetups.len(), 2);
    assert_eq!(meetups[0]["link"], "https://www.meetup.com/seattle-rust/events/1");
    assert_eq!(meetups[0]["name"], "Seattle Rust");
    assert_eq!(meetups[0]["creation_date"], "Fri Jan 01 2010");
    assert_eq!(meetups[0]["host"], "Rustaceans");
    assert_eq!(providers.calls().2, 1);
}

#[tokio::test]
async fn test_missing_data_is_bad_request() {
    let app = spawn_app(FakeProviders::seattle()).await;

    for uri in ["/location", "/weather", "/meetups", "/weather?data=oops"] {
        let (status, _) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {uri}");
    }
}

#[tokio::test]
async fn test_provider_failure_returns_generic_error() {
    let providers = FakeProviders::seattle();
    providers.fail_with(502);
    let app = spawn_app(providers).await;

    let (status, body) = get(&app, "/location?data=Seattle").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, GENERIC_ERROR_BODY.as_bytes());
}

#[tokio::test]
async fn test_no_results_returns_generic_error() {
    let providers = FakeProviders::seattle();
    providers.geocode_results.lock().clear();
    let app = spawn_app(providers).await;

    let (status, body) = get(&app, "/location?data=Atlantis").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, GENERIC_ERROR_BODY.as_bytes());
}

#[tokio::test]
async fn test_unknown_location_is_not_found() {
    let providers = FakeProviders::seattle();
    let app = spawn_app(providers.clone()).await;

    let data = urlencoding::encode(r#"{"id":999}"#).into_owned();
    let (status, body) = get(&app, &format!("/weather?data={data}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, GENERIC_ERROR_BODY.as_bytes());
    assert_eq!(providers.calls(), (0, 0, 0));
}
