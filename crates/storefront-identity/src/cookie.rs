//! Cart-session cookie.
//!
//! Anonymous shoppers carry the id of their anonymous cart in an HTTP-only
//! cookie. The value is opaque to the client; the store only trusts it for carts
//! that are still ownerless.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use uuid::Uuid;

/// Cookie name for the anonymous cart token.
pub const CART_COOKIE: &str = "storefront_cart";

/// Cookie Max-Age in seconds (30 days).
pub const CART_COOKIE_MAX_AGE: i64 = 2_592_000;

/// Read the anonymous cart token from the jar. Malformed values are ignored.
///
/// ```
/// use axum_extra::extract::cookie::{Cookie, CookieJar};
/// use storefront_identity::cookie::{cart_token, CART_COOKIE};
/// use uuid::Uuid;
///
/// let id = Uuid::now_v7();
/// let jar = CookieJar::new().add(Cookie::new(CART_COOKIE, id.to_string()));
/// assert_eq!(cart_token(&jar), Some(id));
///
/// let jar = CookieJar::new().add(Cookie::new(CART_COOKIE, "garbage"));
/// assert_eq!(cart_token(&jar), None);
/// ```
pub fn cart_token(jar: &CookieJar) -> Option<Uuid> {
    jar.get(CART_COOKIE)
        .and_then(|cookie| cookie.value().parse::<Uuid>().ok())
}

/// Set the cart-session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use storefront_identity::cookie::{set_cart_cookie, CART_COOKIE};
/// use uuid::Uuid;
///
/// let id = Uuid::now_v7();
/// let jar = set_cart_cookie(CookieJar::new(), id, "shop.example.com".to_string());
/// let cookie = jar.get(CART_COOKIE).unwrap();
/// assert_eq!(cookie.value(), id.to_string());
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("shop.example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2_592_000)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_cart_cookie(jar: CookieJar, cart_id: Uuid, domain: String) -> CookieJar {
    let cookie = Cookie::build((CART_COOKIE, cart_id.to_string()))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(CART_COOKIE_MAX_AGE))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Expire the cart-session cookie.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use storefront_identity::cookie::{clear_cart_cookie, set_cart_cookie, CART_COOKIE};
/// use uuid::Uuid;
///
/// let jar = set_cart_cookie(CookieJar::new(), Uuid::now_v7(), "shop.example.com".to_string());
/// let jar = clear_cart_cookie(jar, "shop.example.com".to_string());
/// let cookie = jar.get(CART_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_cart_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((CART_COOKIE, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
