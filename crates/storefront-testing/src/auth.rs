//! Mock identity helpers for router tests.
//!
//! Services behind the gateway receive the `x-storefront-user-id` header and the
//! cart-session cookie. In tests, `MockAuth` builds both directly so no real
//! gateway is needed.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

use storefront_identity::cookie::CART_COOKIE;
use storefront_identity::identity::USER_ID_HEADER;

/// Configurable identity injected into test requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuth {
    pub user_id: Option<Uuid>,
    pub cart_token: Option<Uuid>,
}

impl MockAuth {
    /// An authenticated shopper.
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            cart_token: None,
        }
    }

    /// An anonymous shopper, optionally holding a cart token.
    pub fn anonymous(cart_token: Option<Uuid>) -> Self {
        Self {
            user_id: None,
            cart_token,
        }
    }

    pub fn with_cart_token(mut self, cart_token: Uuid) -> Self {
        self.cart_token = Some(cart_token);
        self
    }

    /// Return headers as if the gateway and browser had set them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(user_id) = self.user_id {
            map.insert(
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from_str(&user_id.to_string()).unwrap(),
            );
        }
        if let Some(token) = self.cart_token {
            map.insert(
                COOKIE,
                HeaderValue::from_str(&format!("{CART_COOKIE}={token}")).unwrap(),
            );
        }
        map
    }
}
