//! `POST /api/analyze`: a seller's rank and price gap on a Kaspi product.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use salescout_kaspi::{
    resolve, FetchOptions, KaspiError, ProxyList, ResolveOptions, ResolverReport,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

/// Analyze request body. Every field is optional at this layer: a value of
/// the wrong JSON type reads as absent, and `options` falls back to its
/// defaults field by field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeRequest {
    #[serde(default, deserialize_with = "lenient")]
    product_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    my_shop_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    options: AnalyzeOptions,
}

/// Optional per-request overrides. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalyzeOptions {
    #[serde(default, deserialize_with = "lenient")]
    fallback_without_zone: bool,
    #[serde(default, deserialize_with = "lenient_city")]
    city_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    zone_id: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    proxy_urls: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    debug: bool,
}

/// Reads `T`, or `T::default()` when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// City codes are numeric, so a bare JSON number is accepted as well.
fn lenient_city<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(city) => Some(city),
        Value::Number(city) => Some(city.to_string()),
        _ => None,
    })
}

impl From<KaspiError> for ApiError {
    fn from(err: KaspiError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ResolverReport>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::info!(request_id = %req_id.0, error = %rejection, "rejected analyze body");
        ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })?;

    let (Some(product_url), Some(my_shop_name)) = (
        non_blank(request.product_url),
        non_blank(request.my_shop_name),
    ) else {
        return Err(ApiError::bad_request(
            "productUrl and myShopName are required",
        ));
    };

    let opts = resolve_options(&state, request.options);
    let deadline = Duration::from_secs(state.config.request_timeout_secs);

    tracing::info!(
        request_id = %req_id.0,
        product_url = %product_url,
        fallback_without_zone = opts.fallback_without_zone,
        proxies = opts.fetch.proxies.len(),
        "analyzing product"
    );

    let outcome = tokio::time::timeout(
        deadline,
        resolve(state.kaspi.as_ref(), &product_url, &my_shop_name, &opts),
    )
    .await;

    match outcome {
        Ok(Ok(report)) => Ok(Json(report)),
        Ok(Err(err)) => {
            tracing::warn!(request_id = %req_id.0, error = %err, "analyze failed");
            Err(err.into())
        }
        Err(_) => {
            tracing::warn!(
                request_id = %req_id.0,
                deadline_secs = deadline.as_secs(),
                "analyze timed out"
            );
            Err(ApiError::bad_request(format!(
                "analysis timed out after {}s",
                deadline.as_secs()
            )))
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Merges request overrides over the process defaults.
fn resolve_options(state: &AppState, options: AnalyzeOptions) -> ResolveOptions {
    let proxies = match options.proxy_urls {
        Some(urls) if !urls.is_empty() => ProxyList::parse(urls, options.debug),
        _ => state.proxies.clone(),
    };

    let city_id = options
        .city_id
        .and_then(|c| non_blank(Some(c)))
        .unwrap_or_else(|| state.config.kaspi_city_id.clone());

    ResolveOptions {
        fetch: FetchOptions {
            city_id,
            zone_ids: options
                .zone_id
                .unwrap_or_else(|| state.config.kaspi_zone_ids.clone()),
            proxies,
            debug: options.debug,
        },
        fallback_without_zone: options.fallback_without_zone,
        max_pages: state.config.max_pages,
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
