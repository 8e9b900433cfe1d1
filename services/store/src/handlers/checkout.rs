use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_identity::cookie::cart_token;
use storefront_identity::identity::IdentityHeaders;

use crate::domain::types::ShippingInfo;
use crate::error::StoreServiceError;
use crate::handlers::cart::{CartLineResponse, apply_session, line_responses};
use crate::state::AppState;
use crate::usecase::checkout::{CheckoutUseCase, GetCheckoutUseCase};

// ── GET /checkout ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ShippingPrefill {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub cart_items: Vec<CartLineResponse>,
    pub cart_count: u64,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub cart_total: Decimal,
    pub prefill: ShippingPrefill,
}

pub async fn get_checkout(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CheckoutResponse>), StoreServiceError> {
    let usecase = GetCheckoutUseCase {
        carts: state.cart_repo(),
        profiles: state.profile_repo(),
    };
    let view = usecase.execute(identity.user_id, cart_token(&jar)).await?;
    let jar = apply_session(jar, view.resolved.session, &state.cookie_domain);
    Ok((
        jar,
        Json(CheckoutResponse {
            cart_items: line_responses(&view.summary),
            cart_count: view.summary.item_count(),
            cart_total: view.summary.total(),
            prefill: ShippingPrefill {
                first_name: view.prefill.first_name,
                last_name: view.prefill.last_name,
                email: view.prefill.email,
            },
        }),
    ))
}

// ── POST /checkout ───────────────────────────────────────────────────────────

/// Missing fields deserialize as empty and are reported by validation.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
}

#[derive(Serialize)]
pub struct PlacedOrderResponse {
    pub order_id: String,
}

pub async fn checkout(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, CookieJar, Json<PlacedOrderResponse>), StoreServiceError> {
    let usecase = CheckoutUseCase {
        carts: state.cart_repo(),
        orders: state.order_repo(),
    };
    let placed = usecase
        .execute(
            identity.user_id,
            cart_token(&jar),
            ShippingInfo {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                address: body.address,
                postal_code: body.postal_code,
                city: body.city,
            },
        )
        .await?;
    let jar = apply_session(jar, placed.resolved.session, &state.cookie_domain);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(PlacedOrderResponse {
            order_id: placed.order.id.to_string(),
        }),
    ))
}
