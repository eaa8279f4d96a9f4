use std::net::SocketAddr;

/// Storefront city used when neither the environment nor a request names one
/// (Almaty).
pub const DEFAULT_KASPI_CITY_ID: &str = "750000000";

/// Storefront delivery zone sent with offers requests by default.
pub const DEFAULT_KASPI_ZONE_ID: &str = "Magnum_ZONE1";

/// Upper bound on offers pages scanned for one product.
pub const DEFAULT_MAX_PAGES: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Raw egress proxy URLs from `PROXY_URLS`. Validation happens when the
    /// resolver builds its proxy list.
    pub proxy_urls: Vec<String>,
    pub kaspi_city_id: String,
    pub kaspi_zone_ids: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_pages: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Proxy URLs routinely embed credentials.
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "proxy_urls",
                &format_args!("[{} redacted]", self.proxy_urls.len()),
            )
            .field("kaspi_city_id", &self.kaspi_city_id)
            .field("kaspi_zone_ids", &self.kaspi_zone_ids)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}
