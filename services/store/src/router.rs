use axum::{
    Router,
    routing::{get, post},
};

use storefront_core::health::healthz;
use storefront_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    cart::{add_to_cart, get_cart, remove_from_cart},
    catalog::{get_categories, get_category_products, get_product, get_products},
    checkout::{checkout, get_checkout},
    health::readyz,
    order::{get_order, get_orders},
    profile::{get_me, update_me},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Catalog
        .route("/categories", get(get_categories))
        .route("/categories/{slug}/products", get(get_category_products))
        .route("/products", get(get_products))
        .route("/products/{slug}", get(get_product))
        // Cart
        .route("/cart", get(get_cart))
        .route(
            "/cart/items/{product_id}",
            post(add_to_cart).delete(remove_from_cart),
        )
        // Checkout
        .route("/checkout", get(get_checkout).post(checkout))
        // Orders
        .route("/users/@me/orders", get(get_orders))
        .route("/users/@me/orders/{order_id}", get(get_order))
        // Profile
        .route("/users/@me", get(get_me).patch(update_me))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
