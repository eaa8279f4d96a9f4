//! Egress proxy rotation list.

use std::sync::Arc;

use reqwest::Url;

/// Ordered, validated list of egress proxies. Cheap to clone.
///
/// Attempt `k` of a page fetch goes through `proxies[k % len]`; an empty list
/// means direct connections.
#[derive(Clone, Default)]
pub struct ProxyList {
    urls: Arc<[Url]>,
}

impl ProxyList {
    /// Builds a list from raw strings, keeping entries that parse as URLs with
    /// an `http` or `https` scheme. Blank entries are skipped; other invalid
    /// entries are dropped and, when `debug` is set, logged.
    pub fn parse<I, S>(raw: I, debug: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<Url> = raw
            .into_iter()
            .filter_map(|item| {
                let value = item.as_ref().trim();
                if value.is_empty() {
                    return None;
                }
                match Url::parse(value) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
                    _ => {
                        if debug {
                            tracing::warn!(
                                proxy = %redact(value),
                                "invalid proxy url ignored"
                            );
                        }
                        None
                    }
                }
            })
            .collect();
        Self { urls: urls.into() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// The proxy to use for zero-based `attempt`, or `None` for a direct
    /// connection.
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Option<&Url> {
        if self.urls.is_empty() {
            return None;
        }
        self.urls.get(attempt as usize % self.urls.len())
    }
}

impl std::fmt::Debug for ProxyList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.urls.iter().map(|u| redact(u.as_str())))
            .finish()
    }
}

/// Strips userinfo so proxy credentials never reach the logs.
pub(crate) fn redact(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if !url.username().is_empty() || url.password().is_some() {
                // Both setters only fail for cannot-be-a-base URLs.
                let _ = url.set_username("***");
                let _ = url.set_password(None);
            }
            url.to_string()
        }
        Err(_) => "<unparseable>".to_owned(),
    }
}
