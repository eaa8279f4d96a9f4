//! Shared wiremock helpers for the offers endpoint.

#![allow(dead_code)]

use std::time::Duration;

use salescout_kaspi::KaspiClient;
use serde_json::{json, Value};
use wiremock::{Match, Request};

pub const PRODUCT_ID: &str = "145467625";
pub const PRODUCT_URL: &str = "https://kaspi.kz/shop/p/foo-145467625/";
pub const OFFERS_PATH: &str = "/yml/offer-view/offers/145467625";

/// Client against `base_url` with fast, bounded retries.
pub fn test_client(base_url: &str) -> KaspiClient {
    KaspiClient::with_base_url(5, base_url)
        .expect("failed to build test KaspiClient")
        .with_retry_policy(3, Duration::from_millis(10))
}

/// Matches when the JSON request body has `field` exactly equal to `value`.
///
/// `body_partial_json` treats `[]` as "any array", which cannot tell the
/// zoneless fallback apart from a normal request.
pub struct BodyField(pub &'static str, pub Value);

impl Match for BodyField {
    fn matches(&self, request: &Request) -> bool {
        request
            .body_json::<Value>()
            .is_ok_and(|body| body.get(self.0) == Some(&self.1))
    }
}

pub fn page_is(page: u32) -> BodyField {
    BodyField("page", json!(page))
}

pub fn zone_is(zones: &[&str]) -> BodyField {
    BodyField("zoneId", json!(zones))
}

pub fn offers(items: &[(&str, f64)]) -> Value {
    let offers: Vec<Value> = items
        .iter()
        .map(|(name, price)| json!({ "merchantName": name, "price": price, "merchantId": "m" }))
        .collect();
    json!({ "offers": offers, "total": 42 })
}

pub fn five_non_matching() -> Value {
    offers(&[
        ("Leader", 200.0),
        ("Shop B", 201.0),
        ("Shop C", 202.0),
        ("Shop D", 203.0),
        ("Shop E", 204.0),
    ])
}
