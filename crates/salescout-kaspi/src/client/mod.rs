//! HTTP client for Kaspi's storefront offers endpoint
//! (`POST /yml/offer-view/offers/<productId>`).

mod payload;

use std::borrow::Cow;
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::KaspiError;
use crate::proxy::redact;
use crate::resolver::{FetchOptions, OffersSource};
use crate::retry::retry_with_backoff;
use crate::types::{OfferPage, ProductId};

use payload::{offers_headers, OffersRequest};

const DEFAULT_BASE_URL: &str = "https://kaspi.kz/";

/// Attempts per page, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the second attempt; doubles for each later one.
pub const BACKOFF_BASE: Duration = Duration::from_millis(300);

/// Characters of a failed response body echoed in debug diagnostics.
const ERROR_PREVIEW_CHARS: usize = 500;

/// Characters of an empty-offers payload echoed in debug diagnostics.
const EMPTY_PREVIEW_CHARS: usize = 800;

/// Client for the Kaspi offers endpoint.
///
/// Each page request is retried up to [`MAX_ATTEMPTS`] times on transport
/// errors, non-2xx statuses and non-JSON bodies, sleeping
/// `BACKOFF_BASE * 2^attempt` between attempts and rotating through the
/// caller's proxies.
pub struct KaspiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    max_attempts: u32,
    backoff_base: Duration,
}

impl KaspiClient {
    /// Creates a client pointed at the production storefront.
    ///
    /// `timeout_secs` bounds each individual HTTP attempt.
    ///
    /// # Errors
    ///
    /// Returns [`KaspiError::ClientBuild`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, KaspiError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// Origin and Referer headers still name the real storefront.
    ///
    /// # Errors
    ///
    /// Returns [`KaspiError::ClientBuild`] if the `reqwest::Client` cannot be
    /// constructed, or [`KaspiError::InvalidBaseUrl`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, KaspiError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = build_http_client(timeout, None)?;

        // Ensure exactly one trailing slash so `join` appends to the base path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| KaspiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            max_attempts: MAX_ATTEMPTS,
            backoff_base: BACKOFF_BASE,
        })
    }

    /// Overrides the retry policy. Tests use this to avoid real backoff sleeps.
    #[must_use]
    pub fn with_retry_policy(mut self, max_attempts: u32, backoff_base: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.backoff_base = backoff_base;
        self
    }

    /// Fetches one zero-based page of offers for `product_id`, sorted by
    /// ascending price.
    ///
    /// Any JSON body is accepted; a missing or non-array `offers` field is an
    /// empty page.
    ///
    /// # Errors
    ///
    /// After all attempts are exhausted:
    /// - [`KaspiError::UnexpectedStatus`]: non-2xx response.
    /// - [`KaspiError::Http`]: network, TLS or timeout failure.
    /// - [`KaspiError::Deserialize`]: body is not valid JSON.
    ///
    /// Immediately: [`KaspiError::InvalidProxy`] or [`KaspiError::ClientBuild`]
    /// if a proxied client cannot be built.
    pub async fn fetch_offers_page(
        &self,
        product_id: &ProductId,
        page: u32,
        opts: &FetchOptions,
    ) -> Result<OfferPage, KaspiError> {
        let url = self.offers_url(product_id)?;
        let body = OffersRequest::new(product_id, page, opts);

        let payload = retry_with_backoff(self.max_attempts, self.backoff_base, |attempt| {
            let url = url.clone();
            let body = &body;
            async move {
                let proxy = opts.proxies.for_attempt(attempt);
                let http = match proxy {
                    // Dropped with the attempt, releasing its connection pool.
                    Some(proxy_url) => {
                        Cow::Owned(build_http_client(self.timeout, Some(proxy_url))?)
                    }
                    None => Cow::Borrowed(&self.client),
                };

                tracing::debug!(
                    product_id = %product_id,
                    page,
                    attempt,
                    proxy = proxy.map(|p| redact(p.as_str())),
                    "requesting Kaspi offers page"
                );

                let response = http
                    .post(url)
                    .headers(offers_headers(product_id, &opts.city_id))
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();
                // Read the body to completion on every path so the connection
                // can be reused.
                let text = response.text().await?;

                if !status.is_success() {
                    if opts.debug {
                        tracing::warn!(
                            product_id = %product_id,
                            page,
                            status = status.as_u16(),
                            preview = %preview(&text, ERROR_PREVIEW_CHARS),
                            "Kaspi offers request returned non-success status"
                        );
                    }
                    return Err(KaspiError::UnexpectedStatus {
                        status: status.as_u16(),
                    });
                }

                serde_json::from_str::<Value>(&text).map_err(|source| {
                    if opts.debug {
                        tracing::warn!(
                            product_id = %product_id,
                            page,
                            preview = %preview(&text, ERROR_PREVIEW_CHARS),
                            "Kaspi offers response is not valid JSON"
                        );
                    }
                    KaspiError::Deserialize {
                        context: format!("offers page {page} for product {product_id}"),
                        source,
                    }
                })
            }
        })
        .await?;

        let offers = OfferPage::from_payload(&payload);
        if offers.is_empty() && opts.debug {
            log_empty_payload(product_id, page, opts, &payload);
        }
        Ok(offers)
    }

    /// Builds the offers endpoint URL for `product_id`.
    fn offers_url(&self, product_id: &ProductId) -> Result<Url, KaspiError> {
        self.base_url
            .join(&format!("yml/offer-view/offers/{product_id}"))
            .map_err(|e| KaspiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl OffersSource for KaspiClient {
    fn fetch_page(
        &self,
        product_id: &ProductId,
        page: u32,
        opts: &FetchOptions,
    ) -> impl std::future::Future<Output = Result<OfferPage, KaspiError>> + Send {
        self.fetch_offers_page(product_id, page, opts)
    }
}

fn build_http_client(timeout: Duration, proxy: Option<&Url>) -> Result<Client, KaspiError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10));

    if let Some(proxy_url) = proxy {
        let proxy =
            reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| KaspiError::InvalidProxy {
                url: redact(proxy_url.as_str()),
                reason: e.to_string(),
            })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(KaspiError::ClientBuild)
}

/// Logs why a page came back empty: the top-level keys and a payload prefix.
fn log_empty_payload(product_id: &ProductId, page: u32, opts: &FetchOptions, payload: &Value) {
    let zone = if opts.zone_ids.is_empty() {
        "without zone"
    } else {
        "with zone"
    };

    let Some(object) = payload.as_object() else {
        tracing::warn!(
            product_id = %product_id,
            page,
            zone,
            "Kaspi offers response is not an object"
        );
        return;
    };

    let keys = object.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
    tracing::warn!(
        product_id = %product_id,
        page,
        zone,
        keys = %keys,
        preview = %preview(&payload.to_string(), EMPTY_PREVIEW_CHARS),
        "Kaspi offers empty"
    );
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
