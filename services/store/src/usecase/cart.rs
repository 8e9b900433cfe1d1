use anyhow::anyhow;
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{CartRepository, CatalogRepository};
use crate::domain::types::{
    Cart, CartContext, CartResolution, CartSummary, CartTotals, MAX_LINE_QUANTITY, ResolvedCart,
    SessionAction,
};
use crate::error::StoreServiceError;

// ── ResolveCart ──────────────────────────────────────────────────────────────

/// Find or create the cart for a request.
///
/// Authenticated shoppers get their user cart. The anonymous cart named by the
/// token is merged only while creating that user cart for the first time; a user
/// who already has a cart keeps it and the anonymous cart is left untouched.
/// Anonymous shoppers get the ownerless cart named by their token, or a new one.
pub async fn resolve_cart<C: CartRepository>(
    carts: &C,
    ctx: &CartContext,
) -> Result<ResolvedCart, StoreServiceError> {
    match ctx.user_id {
        Some(user_id) => resolve_user_cart(carts, user_id, ctx.cart_token).await,
        None => resolve_anonymous_cart(carts, ctx.cart_token).await,
    }
}

async fn resolve_user_cart<C: CartRepository>(
    carts: &C,
    user_id: Uuid,
    cart_token: Option<Uuid>,
) -> Result<ResolvedCart, StoreServiceError> {
    if let Some(cart) = carts.find_user_cart(user_id).await? {
        return Ok(resolved(cart, CartResolution::Found, SessionAction::Keep));
    }

    let anonymous = match cart_token {
        Some(token) => carts.find_anonymous_cart(token).await?,
        None => None,
    };
    if let Some(anonymous) = anonymous {
        let Some(merged) = carts.create_user_cart_merging(user_id, anonymous.id).await? else {
            return existing_user_cart(carts, user_id).await;
        };
        return Ok(match merged.absorbed {
            Some(absorbed) => {
                info!(
                    user_id = %user_id,
                    cart_id = %merged.cart.id,
                    anonymous_cart_id = %anonymous.id,
                    absorbed,
                    "merged anonymous cart"
                );
                resolved(
                    merged.cart,
                    CartResolution::Merged { absorbed },
                    SessionAction::Clear,
                )
            }
            None => resolved(merged.cart, CartResolution::Created, SessionAction::Keep),
        });
    }

    match carts.create_user_cart(user_id).await? {
        Some(cart) => Ok(resolved(cart, CartResolution::Created, SessionAction::Keep)),
        None => existing_user_cart(carts, user_id).await,
    }
}

/// The user cart after a concurrent request created it first.
async fn existing_user_cart<C: CartRepository>(
    carts: &C,
    user_id: Uuid,
) -> Result<ResolvedCart, StoreServiceError> {
    let cart = carts
        .find_user_cart(user_id)
        .await?
        .ok_or_else(|| anyhow!("user cart missing after conflicting insert"))?;
    Ok(resolved(cart, CartResolution::Found, SessionAction::Keep))
}

async fn resolve_anonymous_cart<C: CartRepository>(
    carts: &C,
    cart_token: Option<Uuid>,
) -> Result<ResolvedCart, StoreServiceError> {
    if let Some(token) = cart_token {
        if let Some(cart) = carts.find_anonymous_cart(token).await? {
            return Ok(resolved(cart, CartResolution::Found, SessionAction::Keep));
        }
    }
    let cart = carts.create_anonymous_cart().await?;
    let session = SessionAction::Set(cart.id);
    Ok(resolved(cart, CartResolution::Created, session))
}

fn resolved(cart: Cart, resolution: CartResolution, session: SessionAction) -> ResolvedCart {
    ResolvedCart {
        cart,
        resolution,
        session,
    }
}

async fn summarize<C: CartRepository>(
    carts: &C,
    cart_id: Uuid,
) -> Result<CartSummary, StoreServiceError> {
    Ok(CartSummary {
        lines: carts.list_lines(cart_id).await?,
    })
}

pub struct ResolveCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> ResolveCartUseCase<C> {
    pub async fn execute(&self, ctx: &CartContext) -> Result<ResolvedCart, StoreServiceError> {
        resolve_cart(&self.carts, ctx).await
    }
}

// ── GetCart ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CartView {
    pub resolved: ResolvedCart,
    pub summary: CartSummary,
}

pub struct GetCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> GetCartUseCase<C> {
    pub async fn execute(&self, ctx: &CartContext) -> Result<CartView, StoreServiceError> {
        let resolved = resolve_cart(&self.carts, ctx).await?;
        let summary = summarize(&self.carts, resolved.cart.id).await?;
        Ok(CartView { resolved, summary })
    }
}

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug)]
pub struct AddedToCart {
    pub resolved: ResolvedCart,
    pub product_name: String,
    pub totals: CartTotals,
}

pub struct AddToCartUseCase<C: CartRepository, P: CatalogRepository> {
    pub carts: C,
    pub catalog: P,
    pub reject_unavailable: bool,
}

impl<C: CartRepository, P: CatalogRepository> AddToCartUseCase<C, P> {
    pub async fn execute(
        &self,
        ctx: &CartContext,
        input: AddToCartInput,
    ) -> Result<AddedToCart, StoreServiceError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&input.quantity) {
            return Err(StoreServiceError::InvalidQuantity);
        }
        let product = self
            .catalog
            .find_product(input.product_id)
            .await?
            .ok_or(StoreServiceError::ProductNotFound)?;
        if self.reject_unavailable && !product.available {
            return Err(StoreServiceError::ProductUnavailable);
        }

        let resolved = resolve_cart(&self.carts, ctx).await?;
        self.carts
            .add_item(resolved.cart.id, product.id, input.quantity)
            .await?;
        let totals = summarize(&self.carts, resolved.cart.id).await?.totals();
        Ok(AddedToCart {
            resolved,
            product_name: product.name,
            totals,
        })
    }
}

// ── RemoveFromCart ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RemovedFromCart {
    pub resolved: ResolvedCart,
    pub product_name: String,
    /// `false` when the cart did not hold the product; nothing changed.
    pub found: bool,
    pub totals: CartTotals,
}

pub struct RemoveFromCartUseCase<C: CartRepository, P: CatalogRepository> {
    pub carts: C,
    pub catalog: P,
}

impl<C: CartRepository, P: CatalogRepository> RemoveFromCartUseCase<C, P> {
    pub async fn execute(
        &self,
        ctx: &CartContext,
        product_id: Uuid,
    ) -> Result<RemovedFromCart, StoreServiceError> {
        let product = self
            .catalog
            .find_product(product_id)
            .await?
            .ok_or(StoreServiceError::ProductNotFound)?;

        let resolved = resolve_cart(&self.carts, ctx).await?;
        let found = self.carts.remove_one(resolved.cart.id, product.id).await?;
        let totals = summarize(&self.carts, resolved.cart.id).await?.totals();
        Ok(RemovedFromCart {
            resolved,
            product_name: product.name,
            found,
            totals,
        })
    }
}
