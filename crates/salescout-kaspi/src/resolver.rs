//! Locates a shop among a product's paginated offers and reports its rank
//! and price gap to the leader.

use std::future::Future;

use salescout_core::{DEFAULT_KASPI_CITY_ID, DEFAULT_KASPI_ZONE_ID, DEFAULT_MAX_PAGES};

use crate::error::KaspiError;
use crate::normalize::normalize_shop_name;
use crate::product_url::parse_product_url;
use crate::proxy::ProxyList;
use crate::types::{OfferPage, ProductId, ResolverReport, PAGE_LIMIT};

/// Per-request storefront parameters for offers requests.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub city_id: String,
    pub zone_ids: Vec<String>,
    pub proxies: ProxyList,
    /// Emit diagnostics for empty pages and upstream anomalies.
    pub debug: bool,
}

impl FetchOptions {
    /// Same options with the storefront zone list cleared.
    #[must_use]
    pub fn without_zones(&self) -> Self {
        Self {
            zone_ids: Vec::new(),
            ..self.clone()
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            city_id: DEFAULT_KASPI_CITY_ID.to_owned(),
            zone_ids: vec![DEFAULT_KASPI_ZONE_ID.to_owned()],
            proxies: ProxyList::default(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub fetch: FetchOptions,
    /// Retry an empty page 0 once with no zone filter.
    pub fallback_without_zone: bool,
    /// Reaching this many pages is reported as "shop not found", not as an
    /// error.
    pub max_pages: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            fallback_without_zone: false,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Anything that can produce a page of offers. Implemented by
/// [`crate::KaspiClient`]; tests substitute in-memory sources.
pub trait OffersSource {
    fn fetch_page(
        &self,
        product_id: &ProductId,
        page: u32,
        opts: &FetchOptions,
    ) -> impl Future<Output = Result<OfferPage, KaspiError>> + Send;
}

/// Resolves `my_shop_name`'s position and price gap on the product behind
/// `product_url`.
///
/// Pages are fetched strictly in order starting at 0; the first offer of
/// page 0 is the leader. Scanning stops at the first offer whose normalized
/// merchant name equals the normalized `my_shop_name`, at the first empty
/// page, or after `opts.max_pages` pages.
///
/// A product with no offers at all is a successful report with every
/// optional field `None`.
///
/// # Errors
///
/// - [`KaspiError::UnsupportedPlatform`] / [`KaspiError::ProductIdNotFound`]
///   before any network I/O when the URL is unusable.
/// - Any error from `source` after its own retries are exhausted.
pub async fn resolve<S: OffersSource>(
    source: &S,
    product_url: &str,
    my_shop_name: &str,
    opts: &ResolveOptions,
) -> Result<ResolverReport, KaspiError> {
    let product_id = parse_product_url(product_url)?;
    let target = normalize_shop_name(Some(my_shop_name));

    let mut first_page = source.fetch_page(&product_id, 0, &opts.fetch).await?;

    if first_page.is_empty() && opts.fallback_without_zone {
        tracing::info!(
            product_id = %product_id,
            "page 0 empty, retrying without zone filter"
        );
        // Only page 0 is retried zoneless; later pages keep the caller's zones.
        first_page = source
            .fetch_page(&product_id, 0, &opts.fetch.without_zones())
            .await?;
    }

    let Some(leader) = first_page.leader() else {
        tracing::info!(product_id = %product_id, "no offers listed");
        return Ok(ResolverReport::no_offers(product_id));
    };

    let mut report = ResolverReport {
        leader_shop: Some(leader.merchant_name.clone()),
        leader_price: leader.price,
        ..ResolverReport::no_offers(product_id.clone())
    };

    let mut page_index = 0u32;
    let mut page = first_page;
    loop {
        let hit = page.offers.iter().enumerate().find(|(_, offer)| {
            !target.is_empty() && normalize_shop_name(Some(&offer.merchant_name)) == target
        });

        if let Some((index, offer)) = hit {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let position = page_index
                .saturating_mul(PAGE_LIMIT)
                .saturating_add(index)
                .saturating_add(1);
            report.my_shop_found = true;
            report.my_shop_price = offer.price;
            report.my_shop_position = Some(position);
            report.price_to_top1 = offer
                .price
                .zip(report.leader_price)
                .map(|(mine, leader)| mine - leader);
            break;
        }

        page_index += 1;
        if page_index >= opts.max_pages {
            tracing::warn!(
                product_id = %product_id,
                max_pages = opts.max_pages,
                "pagination cap reached before shop was found"
            );
            break;
        }

        page = source
            .fetch_page(&product_id, page_index, &opts.fetch)
            .await?;
        if page.is_empty() {
            tracing::debug!(
                product_id = %product_id,
                page = page_index,
                "empty page, pagination finished"
            );
            break;
        }
    }

    tracing::info!(
        product_id = %product_id,
        found = report.my_shop_found,
        position = report.my_shop_position,
        "resolved shop standing"
    );

    Ok(report)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
