#![allow(async_fn_in_trait)]

use uuid::Uuid;

use storefront_domain::pagination::PageRequest;

use crate::domain::types::{
    Cart, CartLine, Category, MergedCart, Order, Product, ProductFilter, ProductListing,
    Profile, ValidShipping,
};
use crate::error::StoreServiceError;

/// Read access to categories and products.
pub trait CatalogRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreServiceError>;

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, StoreServiceError>;

    /// Available products matching the filter.
    async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductListing>, StoreServiceError>;

    /// Product by id regardless of availability.
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreServiceError>;

    /// Available product by slug.
    async fn find_available_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductListing>, StoreServiceError>;

    /// Other available products in the same category, at most `limit`.
    async fn list_related(
        &self,
        product: &Product,
        limit: u64,
    ) -> Result<Vec<ProductListing>, StoreServiceError>;
}

/// Repository for carts and their items.
pub trait CartRepository: Send + Sync {
    async fn find_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError>;

    /// Cart by id, only while it has no owner.
    async fn find_anonymous_cart(&self, id: Uuid) -> Result<Option<Cart>, StoreServiceError>;

    async fn create_anonymous_cart(&self) -> Result<Cart, StoreServiceError>;

    /// Create the user's cart. Returns `None` if the user already has one.
    async fn create_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError>;

    /// Create the user's cart and fold the anonymous cart into it, deleting the
    /// anonymous cart, all in one transaction. Returns `None` without writing
    /// anything if the user already has a cart.
    async fn create_user_cart_merging(
        &self,
        user_id: Uuid,
        anonymous_cart_id: Uuid,
    ) -> Result<Option<MergedCart>, StoreServiceError>;

    /// Items of the cart with live product name and price.
    async fn list_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, StoreServiceError>;

    async fn count_items(&self, cart_id: Uuid) -> Result<u64, StoreServiceError>;

    /// Add `quantity` to the product's item, creating it if absent. Atomic.
    ///
    /// Fails with `InvalidQuantity` and changes nothing when the line would
    /// exceed `MAX_LINE_QUANTITY`.
    async fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), StoreServiceError>;

    /// Decrement the product's item by one, deleting it at quantity 1.
    /// Returns `false` if the cart holds no such item.
    async fn remove_one(&self, cart_id: Uuid, product_id: Uuid)
    -> Result<bool, StoreServiceError>;
}

/// Repository for placed orders.
pub trait OrderRepository: Send + Sync {
    /// Turn the cart's items into an order for `user_id` and empty the cart, in
    /// one transaction. Returns `None` if the cart has no items.
    async fn place_order(
        &self,
        cart_id: Uuid,
        user_id: Uuid,
        shipping: &ValidShipping,
    ) -> Result<Option<Order>, StoreServiceError>;

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, StoreServiceError>;
}

/// Repository for shopper profiles.
pub trait ProfileRepository: Send + Sync {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, StoreServiceError>;
    async fn upsert(&self, profile: &Profile) -> Result<(), StoreServiceError>;
}
