use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{CartRepository, OrderRepository, ProfileRepository};
use crate::domain::types::{CartContext, CartSummary, Order, Profile, ResolvedCart, ShippingInfo};
use crate::error::StoreServiceError;
use crate::usecase::cart::resolve_cart;

// ── GetCheckout ──────────────────────────────────────────────────────────────

/// Cart contents plus the profile used to prefill the shipping form.
#[derive(Debug)]
pub struct CheckoutView {
    pub resolved: ResolvedCart,
    pub summary: CartSummary,
    pub prefill: Profile,
}

pub struct GetCheckoutUseCase<C: CartRepository, P: ProfileRepository> {
    pub carts: C,
    pub profiles: P,
}

impl<C: CartRepository, P: ProfileRepository> GetCheckoutUseCase<C, P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        cart_token: Option<Uuid>,
    ) -> Result<CheckoutView, StoreServiceError> {
        let resolved = resolve_cart(&self.carts, &CartContext::user(user_id, cart_token)).await?;
        let summary = CartSummary {
            lines: self.carts.list_lines(resolved.cart.id).await?,
        };
        if summary.is_empty() {
            return Err(StoreServiceError::EmptyCart);
        }
        let prefill = self
            .profiles
            .find(user_id)
            .await?
            .unwrap_or_else(|| Profile::empty(user_id));
        Ok(CheckoutView {
            resolved,
            summary,
            prefill,
        })
    }
}

// ── Checkout ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PlacedOrder {
    pub resolved: ResolvedCart,
    pub order: Order,
}

pub struct CheckoutUseCase<C: CartRepository, O: OrderRepository> {
    pub carts: C,
    pub orders: O,
}

impl<C: CartRepository, O: OrderRepository> CheckoutUseCase<C, O> {
    /// Place an order from the user's cart.
    ///
    /// Checks run in order: non-empty cart, then shipping fields. The order,
    /// its items and the emptying of the cart are written in one transaction.
    pub async fn execute(
        &self,
        user_id: Uuid,
        cart_token: Option<Uuid>,
        shipping: ShippingInfo,
    ) -> Result<PlacedOrder, StoreServiceError> {
        let resolved = resolve_cart(&self.carts, &CartContext::user(user_id, cart_token)).await?;
        if self.carts.count_items(resolved.cart.id).await? == 0 {
            return Err(StoreServiceError::EmptyCart);
        }
        let shipping = shipping
            .validate()
            .map_err(StoreServiceError::InvalidShipping)?;

        let order = self
            .orders
            .place_order(resolved.cart.id, user_id, &shipping)
            .await?
            .ok_or(StoreServiceError::EmptyCart)?;
        info!(
            order_id = %order.id,
            user_id = %user_id,
            items = order.items.len(),
            total = %order.total(),
            "order placed"
        );
        Ok(PlacedOrder { resolved, order })
    }
}
