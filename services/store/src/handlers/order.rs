use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_domain::pagination::PageRequest;
use storefront_identity::identity::IdentityHeaders;

use crate::domain::types::Order;
use crate::error::StoreServiceError;
use crate::state::AppState;
use crate::usecase::order::{GetOrderUseCase, GetOrdersUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: Option<String>,
    pub product_name: String,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub price: Decimal,
    pub quantity: i32,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub total: Decimal,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub items: Vec<OrderItemResponse>,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub total: Decimal,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let total = order.total();
        Self {
            id: order.id.to_string(),
            first_name: order.first_name,
            last_name: order.last_name,
            email: order.email,
            address: order.address,
            postal_code: order.postal_code,
            city: order.city,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    total: item.cost(),
                    product_id: item.product_id.map(|id| id.to_string()),
                    product_name: item.product_name,
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
            total,
            created_at: order.created_at,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrderListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

// ── GET /users/@me/orders ────────────────────────────────────────────────────

pub async fn get_orders(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderResponse>>, StoreServiceError> {
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let usecase = GetOrdersUseCase {
        repo: state.order_repo(),
    };
    let orders = usecase.execute(identity.user_id, page).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

// ── GET /users/@me/orders/{order_id} ─────────────────────────────────────────

pub async fn get_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, StoreServiceError> {
    let usecase = GetOrderUseCase {
        repo: state.order_repo(),
    };
    let order = usecase.execute(identity.user_id, order_id).await?;
    Ok(Json(order.into()))
}
