use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::api::build_app;
use crate::api::test_support::{test_config, test_state};

const OFFERS_PATH: &str = "/yml/offer-view/offers/145467625";
const PRODUCT_URL: &str = "https://kaspi.kz/shop/p/foo-145467625/";

async fn post_analyze(state: AppState, body: Value) -> (StatusCode, Value) {
    post_raw(state, body.to_string()).await
}

async fn post_raw(state: AppState, body: String) -> (StatusCode, Value) {
    let response = build_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

async fn mount_offers(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .and(body_partial_json(json!({ "page": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "offers": [] })))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn returns_report_for_leader_shop() {
    let server = MockServer::start().await;
    mount_offers(
        &server,
        json!({ "offers": [
            { "merchantName": "GadgetPro", "price": 100 },
            { "merchantName": "Other", "price": 110 }
        ]}),
    )
    .await;

    let (status, body) = post_analyze(
        test_state(&server.uri(), test_config()),
        json!({ "productUrl": PRODUCT_URL, "myShopName": "GadgetPro" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "productId": "145467625",
            "leaderShop": "GadgetPro",
            "leaderPrice": 100,
            "myShopFound": true,
            "myShopPrice": 100,
            "myShopPosition": 1,
            "priceToTop1": 0
        })
    );
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let state = test_state("http://127.0.0.1:1", test_config());

    for body in [
        json!({ "myShopName": "GadgetPro" }),
        json!({ "productUrl": PRODUCT_URL }),
        json!({ "productUrl": "   ", "myShopName": "GadgetPro" }),
        json!({ "productUrl": PRODUCT_URL, "myShopName": " \t " }),
        json!({ "productUrl": 145_467_625, "myShopName": "GadgetPro" }),
        json!({}),
    ] {
        let (status, json) = post_analyze(state.clone(), body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["error"], "productUrl and myShopName are required");
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(1));
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_error_body() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let (status, json) = post_raw(state, "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.starts_with("invalid request body")));
}

#[tokio::test]
async fn unsupported_platform_is_bad_request() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let (status, json) = post_analyze(
        state,
        json!({ "productUrl": "https://example.com/x", "myShopName": "Shop" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("unsupported platform")));
}

#[tokio::test]
async fn missing_product_id_is_bad_request() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let (status, json) = post_analyze(
        state,
        json!({
            "productUrl": "https://kaspi.kz/shop/p/no-digits-here/",
            "myShopName": "Shop"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("product id")));
}

#[tokio::test]
async fn upstream_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let (status, json) = post_analyze(
        test_state(&server.uri(), test_config()),
        json!({ "productUrl": PRODUCT_URL, "myShopName": "GadgetPro" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "Kaspi API error: 503" }));
}

#[tokio::test]
async fn options_override_city_and_enable_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .and(header("x-ks-city", "710000000"))
        .and(body_partial_json(json!({ "cityId": "710000000", "page": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offers": [{ "merchantName": "Astana Shop", "price": 500 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "offers": [] })))
        .with_priority(10)
        .mount(&server)
        .await;

    let (status, body) = post_analyze(
        test_state(&server.uri(), test_config()),
        json!({
            "productUrl": PRODUCT_URL,
            "myShopName": "astana shop",
            "options": {
                "cityId": "710000000",
                "fallbackWithoutZone": true,
                "somethingElse": 1
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["myShopFound"], true);
    assert_eq!(body["leaderPrice"], 500);
}

#[tokio::test]
async fn wrongly_typed_options_fall_back_to_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(OFFERS_PATH))
        .and(body_partial_json(json!({ "page": 0, "zoneId": ["Magnum_ZONE1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "offers": [{ "merchantName": "GadgetPro", "price": 100 }]
        })))
        .expect(3)
        .mount(&server)
        .await;

    for options in [
        json!({ "zoneId": "Magnum_ZONE1", "debug": "yes" }),
        json!({ "fallbackWithoutZone": "true", "proxyUrls": "http://10.0.0.1:8080" }),
        json!("fast"),
    ] {
        let (status, body) = post_analyze(
            test_state(&server.uri(), test_config()),
            json!({
                "productUrl": PRODUCT_URL,
                "myShopName": "GadgetPro",
                "options": options.clone()
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "options: {options}");
        assert_eq!(body["myShopPosition"], 1);
    }
}

#[tokio::test]
async fn empty_catalogue_is_success_with_nulls() {
    let server = MockServer::start().await;
    mount_offers(&server, json!({ "offers": [] })).await;

    let (status, body) = post_analyze(
        test_state(&server.uri(), test_config()),
        json!({ "productUrl": PRODUCT_URL, "myShopName": "GadgetPro" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leaderPrice"], Value::Null);
    assert_eq!(body["myShopFound"], false);
}

#[test]
fn resolve_options_fall_back_to_config() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let opts = resolve_options(&state, AnalyzeOptions::default());

    assert_eq!(opts.fetch.city_id, "750000000");
    assert_eq!(opts.fetch.zone_ids, vec!["Magnum_ZONE1".to_string()]);
    assert!(opts.fetch.proxies.is_empty());
    assert!(!opts.fallback_without_zone);
    assert_eq!(opts.max_pages, 50);
}

#[test]
fn resolve_options_apply_overrides() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let options: AnalyzeOptions = serde_json::from_value(json!({
        "cityId": "  ",
        "zoneId": [],
        "proxyUrls": ["http://10.0.0.1:8080", "ftp://nope", "garbage"],
        "debug": true
    }))
    .expect("options");

    let opts = resolve_options(&state, options);

    assert_eq!(opts.fetch.city_id, "750000000", "blank city keeps default");
    assert!(opts.fetch.zone_ids.is_empty());
    assert_eq!(opts.fetch.proxies.len(), 1);
    assert!(opts.fetch.debug);
}

#[test]
fn wrongly_typed_option_values_read_as_absent() {
    let state = test_state("http://127.0.0.1:1", test_config());
    let options: AnalyzeOptions = serde_json::from_value(json!({
        "fallbackWithoutZone": 1,
        "cityId": 710_000_000,
        "zoneId": "Magnum_ZONE5",
        "proxyUrls": { "url": "http://10.0.0.1:8080" },
        "debug": "yes"
    }))
    .expect("lenient options");

    let opts = resolve_options(&state, options);

    assert_eq!(opts.fetch.city_id, "710000000", "numeric city is accepted");
    assert_eq!(opts.fetch.zone_ids, vec!["Magnum_ZONE1".to_string()]);
    assert!(opts.fetch.proxies.is_empty());
    assert!(!opts.fallback_without_zone);
    assert!(!opts.fetch.debug);
}

#[test]
fn empty_proxy_override_keeps_startup_list() {
    let mut state = test_state("http://127.0.0.1:1", test_config());
    state.proxies = ProxyList::parse(["http://10.0.0.9:3128"], false);
    let options: AnalyzeOptions =
        serde_json::from_value(json!({ "proxyUrls": [] })).expect("options");

    let opts = resolve_options(&state, options);
    assert_eq!(opts.fetch.proxies.len(), 1);
}
