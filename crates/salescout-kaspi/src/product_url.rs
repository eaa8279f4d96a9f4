//! Product URL validation and product id extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::KaspiError;
use crate::types::ProductId;

pub(crate) const KASPI_HOST: &str = "kaspi.kz";

/// `...-145467625/` style slugs: digits after the last dash of a segment.
static DASH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9]+)(?:/|\?|$)").expect("valid regex"));

/// `/shop/p/<slug>` where the slug ends in digits without a dash.
static SHOP_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/shop/p/[^/]*?([0-9]+)(?:/|\?|$)").expect("valid regex"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Validates that `product_url` points at the Kaspi storefront and extracts
/// its numeric product id.
///
/// Extraction tries, in order, and takes the first match:
/// 1. a `-<digits>` run followed by `/`, `?` or the end of the URL;
/// 2. trailing digits of the `/shop/p/<slug>` segment;
/// 3. the last run of digits anywhere in the URL.
///
/// # Errors
///
/// - [`KaspiError::UnsupportedPlatform`] if the URL does not parse or its
///   host is neither `kaspi.kz` nor a subdomain of it.
/// - [`KaspiError::ProductIdNotFound`] if no digits can be extracted.
pub fn parse_product_url(product_url: &str) -> Result<ProductId, KaspiError> {
    if !is_kaspi_url(product_url) {
        return Err(KaspiError::UnsupportedPlatform {
            url: product_url.to_owned(),
        });
    }

    extract_product_id(product_url).ok_or_else(|| KaspiError::ProductIdNotFound {
        url: product_url.to_owned(),
    })
}

fn is_kaspi_url(product_url: &str) -> bool {
    reqwest::Url::parse(product_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .is_some_and(|host| {
            host == KASPI_HOST
                || host
                    .strip_suffix(KASPI_HOST)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
}

fn extract_product_id(url: &str) -> Option<ProductId> {
    let captured = |re: &Regex| {
        re.captures(url)
            .and_then(|cap| cap.get(1).map(|m| m.as_str()))
    };

    captured(&DASH_SUFFIX)
        .or_else(|| captured(&SHOP_PATH))
        .or_else(|| DIGIT_RUN.find_iter(url).last().map(|m| m.as_str()))
        .and_then(ProductId::new)
}
