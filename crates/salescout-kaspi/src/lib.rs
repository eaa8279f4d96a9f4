//! Kaspi.kz offers resolver: finds a shop among a product's competing
//! offers and reports its rank and price gap to the cheapest seller.

pub mod client;
pub mod error;
pub mod normalize;
pub mod product_url;
pub mod proxy;
pub mod resolver;
pub mod types;

mod retry;

pub use client::KaspiClient;
pub use error::KaspiError;
pub use normalize::{normalize_shop_name, same_shop};
pub use product_url::parse_product_url;
pub use proxy::ProxyList;
pub use resolver::{resolve, FetchOptions, OffersSource, ResolveOptions};
pub use types::{Offer, OfferPage, Price, ProductId, ResolverReport, PAGE_LIMIT};
