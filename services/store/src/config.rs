use serde::Deserialize;

use storefront_core::config::Config;

/// Store service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3114). Env var: `STORE_PORT`.
    #[serde(default = "default_store_port")]
    pub store_port: u16,
    /// Domain attribute of the cart-session cookie.
    pub cookie_domain: String,
    /// Reject adding unavailable products to a cart. Env var: `REJECT_UNAVAILABLE_PRODUCTS`.
    #[serde(default)]
    pub reject_unavailable_products: bool,
}

fn default_store_port() -> u16 {
    3114
}

impl Config for StoreConfig {}
