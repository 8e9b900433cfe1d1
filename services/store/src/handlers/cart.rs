use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use axum_extra::extract::cookie::CookieJar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_identity::cookie::{cart_token, clear_cart_cookie, set_cart_cookie};
use storefront_identity::identity::OptionalIdentity;

use crate::domain::types::{CartContext, CartSummary, CartTotals, SessionAction};
use crate::error::StoreServiceError;
use crate::state::AppState;
use crate::usecase::cart::{
    AddToCartInput, AddToCartUseCase, GetCartUseCase, RemoveFromCartUseCase,
};

/// Build the cart context from the identity header and the cart cookie.
pub(crate) fn cart_context(identity: OptionalIdentity, jar: &CookieJar) -> CartContext {
    CartContext {
        user_id: identity.user_id(),
        cart_token: cart_token(jar),
    }
}

/// Apply the cookie change requested by cart resolution.
pub(crate) fn apply_session(jar: CookieJar, session: SessionAction, domain: &str) -> CookieJar {
    match session {
        SessionAction::Keep => jar,
        SessionAction::Set(cart_id) => set_cart_cookie(jar, cart_id, domain.to_owned()),
        SessionAction::Clear => clear_cart_cookie(jar, domain.to_owned()),
    }
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CartLineResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub product_price: Decimal,
    pub quantity: i32,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub total: Decimal,
}

pub(crate) fn line_responses(summary: &CartSummary) -> Vec<CartLineResponse> {
    summary
        .lines
        .iter()
        .map(|line| CartLineResponse {
            id: line.item_id.to_string(),
            product_id: line.product_id.to_string(),
            product_name: line.product_name.clone(),
            product_price: line.unit_price,
            quantity: line.quantity,
            total: line.cost(),
        })
        .collect()
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart_items: Vec<CartLineResponse>,
    pub cart_count: u64,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub cart_total: Decimal,
}

#[derive(Serialize)]
pub struct CartUpdateResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_amount"
    )]
    pub cart_total: Option<Decimal>,
}

fn serialize_optional_amount<S>(amount: &Option<Decimal>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match amount {
        Some(amount) => storefront_core::serde::decimal_as_f64(amount, s),
        None => s.serialize_none(),
    }
}

impl CartUpdateResponse {
    fn updated(message: String, totals: CartTotals) -> Self {
        Self {
            success: true,
            message,
            cart_count: Some(totals.item_count),
            cart_total: Some(totals.total),
        }
    }
}

// ── GET /cart ────────────────────────────────────────────────────────────────

pub async fn get_cart(
    identity: OptionalIdentity,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CartResponse>), StoreServiceError> {
    let usecase = GetCartUseCase {
        carts: state.cart_repo(),
    };
    let view = usecase.execute(&cart_context(identity, &jar)).await?;
    let jar = apply_session(jar, view.resolved.session, &state.cookie_domain);
    Ok((
        jar,
        Json(CartResponse {
            cart_items: line_responses(&view.summary),
            cart_count: view.summary.item_count(),
            cart_total: view.summary.total(),
        }),
    ))
}

// ── POST /cart/items/{product_id} ────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct AddToCartRequest {
    pub quantity: Option<i32>,
}

/// An empty body adds one unit. A body that is not an `AddToCartRequest` is
/// `InvalidBody`; range checks on the quantity happen in the use case.
fn parse_add_request(body: &[u8]) -> Result<AddToCartRequest, StoreServiceError> {
    if body.is_empty() {
        return Ok(AddToCartRequest::default());
    }
    serde_json::from_slice(body).map_err(|_| StoreServiceError::InvalidBody)
}

pub async fn add_to_cart(
    identity: OptionalIdentity,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(product_id): Path<Uuid>,
    body: Bytes,
) -> Result<(CookieJar, Json<CartUpdateResponse>), StoreServiceError> {
    let request = parse_add_request(&body)?;
    let usecase = AddToCartUseCase {
        carts: state.cart_repo(),
        catalog: state.catalog_repo(),
        reject_unavailable: state.reject_unavailable_products,
    };
    let added = usecase
        .execute(
            &cart_context(identity, &jar),
            AddToCartInput {
                product_id,
                quantity: request.quantity.unwrap_or(1),
            },
        )
        .await?;
    let jar = apply_session(jar, added.resolved.session, &state.cookie_domain);
    Ok((
        jar,
        Json(CartUpdateResponse::updated(
            format!("{} added to your cart.", added.product_name),
            added.totals,
        )),
    ))
}

// ── DELETE /cart/items/{product_id} ──────────────────────────────────────────

pub async fn remove_from_cart(
    identity: OptionalIdentity,
    State(state): State<AppState>,
    jar: CookieJar,
    Path(product_id): Path<Uuid>,
) -> Result<(CookieJar, Json<CartUpdateResponse>), StoreServiceError> {
    let usecase = RemoveFromCartUseCase {
        carts: state.cart_repo(),
        catalog: state.catalog_repo(),
    };
    let removed = usecase
        .execute(&cart_context(identity, &jar), product_id)
        .await?;
    let jar = apply_session(jar, removed.resolved.session, &state.cookie_domain);
    let response = if removed.found {
        CartUpdateResponse::updated(
            format!("Removed {} from your cart.", removed.product_name),
            removed.totals,
        )
    } else {
        CartUpdateResponse {
            success: false,
            message: "Item not found in cart.".to_owned(),
            cart_count: None,
            cart_total: None,
        }
    };
    Ok((jar, Json(response)))
}
