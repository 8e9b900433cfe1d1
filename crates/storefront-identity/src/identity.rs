//! Gateway-injected identity extractors.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

/// Header carrying the authenticated user's id, set by the gateway.
pub const USER_ID_HEADER: &str = "x-storefront-user-id";

fn user_id_from(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Uuid>().ok())
}

/// Authenticated user identity.
///
/// Returns 401 if the header is absent or cannot be parsed as UUID.
#[derive(Debug, Clone, Copy)]
pub struct IdentityHeaders {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for IdentityHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Extract synchronously and return a 'static future; an `async fn` here would
    // capture the `parts` lifetime.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = user_id_from(parts);
        async move {
            let user_id = user_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { user_id })
        }
    }
}

/// Identity for routes open to anonymous shoppers: `None` when the header is
/// absent or malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalIdentity(pub Option<Uuid>);

impl OptionalIdentity {
    pub fn user_id(self) -> Option<Uuid> {
        self.0
    }
}

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = user_id_from(parts);
        async move { Ok(Self(user_id)) }
    }
}
