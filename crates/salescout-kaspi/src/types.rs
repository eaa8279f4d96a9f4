//! Value types shared by the offers client and the resolver.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Offers requested per upstream page. Fixed by the marketplace storefront.
pub const PAGE_LIMIT: u32 = 5;

/// Numeric product identifier taken from a Kaspi product URL.
///
/// Always a non-empty run of ASCII digits; see [`crate::parse_product_url`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wraps `digits` if it is a non-empty run of ASCII digits.
    #[must_use]
    pub fn new(digits: &str) -> Option<Self> {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(digits.to_owned()))
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An offer price in tenge as reported by the marketplace.
///
/// Serializes as a JSON integer when the value is whole so reports read
/// `100` rather than `100.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(pub f64);

impl Price {
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::ops::Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl Serialize for Price {
    #[allow(clippy::float_cmp)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // 2^53: beyond this f64 no longer represents every integer.
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
        if self.0.fract() == 0.0 && self.0.abs() < MAX_EXACT {
            #[allow(clippy::cast_possible_truncation)]
            return serializer.serialize_i64(self.0 as i64);
        }
        serializer.serialize_f64(self.0)
    }
}

/// One competing offer for a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub merchant_name: String,
    /// `None` when the upstream element carries no numeric `price`.
    pub price: Option<Price>,
}

impl Offer {
    /// Reads an offer from one element of the upstream `offers` array.
    ///
    /// The merchant name comes from `merchantName`, falling back to
    /// `shopName`; a blank value counts as absent. Missing fields never drop
    /// the element, so indexes stay aligned with the upstream array.
    fn from_value(value: &Value) -> Self {
        let price = value.get("price").and_then(Value::as_f64).map(Price);
        let merchant_name = ["merchantName", "shopName"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find(|name| !name.is_empty())
            .unwrap_or_default()
            .to_owned();
        Self {
            merchant_name,
            price,
        }
    }
}

/// One upstream page of offers, in the order the marketplace returned them
/// (ascending price).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferPage {
    pub offers: Vec<Offer>,
}

impl OfferPage {
    /// Extracts the `offers` array from an arbitrary upstream payload.
    ///
    /// Any JSON shape is accepted: a missing or non-array `offers` field is
    /// an empty page. Every array element becomes an [`Offer`], whatever
    /// fields it lacks.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let offers = payload
            .get("offers")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Offer::from_value).collect())
            .unwrap_or_default();
        Self { offers }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    #[must_use]
    pub fn leader(&self) -> Option<&Offer> {
        self.offers.first()
    }
}

impl From<Vec<Offer>> for OfferPage {
    fn from(offers: Vec<Offer>) -> Self {
        Self { offers }
    }
}

/// Result of resolving a shop's standing on a product page.
///
/// When `my_shop_found` is `false` the `my_shop_*` and `price_to_top1` fields
/// are `None`. When it is `true` the position is always set; the prices are
/// set whenever the upstream offers carried a numeric price, and
/// `price_to_top1` needs both the leader's and the shop's price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverReport {
    pub product_id: ProductId,
    pub leader_shop: Option<String>,
    pub leader_price: Option<Price>,
    pub my_shop_found: bool,
    pub my_shop_price: Option<Price>,
    pub my_shop_position: Option<u32>,
    pub price_to_top1: Option<Price>,
}

impl ResolverReport {
    /// Report for a product with no offers at all.
    #[must_use]
    pub fn no_offers(product_id: ProductId) -> Self {
        Self {
            product_id,
            leader_shop: None,
            leader_price: None,
            my_shop_found: false,
            my_shop_price: None,
            my_shop_position: None,
            price_to_top1: None,
        }
    }
}
