//! Request body and headers expected by the offers endpoint.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, ORIGIN,
    REFERER, USER_AGENT,
};
use serde::Serialize;

use crate::resolver::FetchOptions;
use crate::types::{ProductId, PAGE_LIMIT};

const STOREFRONT_ORIGIN: &str = "https://kaspi.kz";

const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Body of `POST /yml/offer-view/offers/<productId>`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OffersRequest<'a> {
    city_id: &'a str,
    id: &'a str,
    #[serde(rename = "merchantUID")]
    merchant_uid: [&'a str; 0],
    limit: u32,
    page: u32,
    sort_option: &'static str,
    zone_id: &'a [String],
}

impl<'a> OffersRequest<'a> {
    pub(super) fn new(product_id: &'a ProductId, page: u32, opts: &'a FetchOptions) -> Self {
        Self {
            city_id: &opts.city_id,
            id: product_id.as_str(),
            merchant_uid: [],
            limit: PAGE_LIMIT,
            page,
            sort_option: "PRICE",
            zone_id: &opts.zone_ids,
        }
    }
}

/// Headers that make the request look like the storefront's own product
/// page calling the endpoint.
pub(super) fn offers_headers(product_id: &ProductId, city_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static(STOREFRONT_ORIGIN));
    headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
    headers.insert(
        HeaderName::from_static("x-description-enabled"),
        HeaderValue::from_static("true"),
    );

    // City ids come from request options; skip headers that would not encode
    // rather than failing the whole request.
    let referer = format!("{STOREFRONT_ORIGIN}/shop/p/{product_id}/?c={city_id}");
    if let Ok(value) = HeaderValue::from_str(&referer) {
        headers.insert(REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(city_id) {
        headers.insert(HeaderName::from_static("x-ks-city"), value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("kaspi.storefront.cookie.city={city_id}")) {
        headers.insert(COOKIE, value);
    }

    headers
}
