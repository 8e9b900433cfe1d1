use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_domain::catalog::ProductSortBy;
use storefront_domain::pagination::{PageRequest, Sort};
use storefront_store::domain::repository::{
    CartRepository, CatalogRepository, OrderRepository, ProfileRepository,
};
use storefront_store::domain::types::{
    Cart, CartItem, CartLine, Category, MAX_LINE_QUANTITY, MergeStep, MergedCart, Order,
    OrderItem, Product, ProductFilter, ProductListing, Profile, ShippingInfo, ValidShipping,
    plan_merge,
};
use storefront_store::error::StoreServiceError;

// ── MemoryStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreData {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub carts: Vec<Cart>,
    /// Kept in insertion order, which is the order cart lines are listed in.
    pub items: Vec<CartItem>,
    pub orders: Vec<Order>,
    pub profiles: HashMap<Uuid, Profile>,
}

/// In-memory store implementing every repository trait.
///
/// Clones share the same data, so one store can back several repositories of a
/// use case and be inspected afterwards.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub data: Arc<Mutex<StoreData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, name: &str, slug: &str) -> Category {
        let category = Category {
            id: Uuid::now_v7(),
            name: name.to_owned(),
            slug: slug.to_owned(),
        };
        self.data.lock().unwrap().categories.push(category.clone());
        category
    }

    /// Add a product; `price` is in cents.
    pub fn add_product(&self, category: &Category, name: &str, price: i64) -> Product {
        let mut data = self.data.lock().unwrap();
        // Spread creation times so `created-at` ordering is deterministic.
        let created_at = Utc::now() + Duration::seconds(data.products.len() as i64);
        let product = Product {
            id: Uuid::now_v7(),
            category_id: category.id,
            name: name.to_owned(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: format!("A fine {}.", name.to_lowercase()),
            price: Decimal::new(price, 2),
            available: true,
            image: None,
            created_at,
            updated_at: created_at,
        };
        data.products.push(product.clone());
        product
    }

    pub fn set_price(&self, product_id: Uuid, price: i64) {
        let mut data = self.data.lock().unwrap();
        if let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) {
            product.price = Decimal::new(price, 2);
        }
    }

    pub fn set_available(&self, product_id: Uuid, available: bool) {
        let mut data = self.data.lock().unwrap();
        if let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) {
            product.available = available;
        }
    }

    pub fn cart(&self, cart_id: Uuid) -> Option<Cart> {
        let data = self.data.lock().unwrap();
        data.carts.iter().find(|c| c.id == cart_id).cloned()
    }

    pub fn items_of(&self, cart_id: Uuid) -> Vec<CartItem> {
        let data = self.data.lock().unwrap();
        data.items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect()
    }

    pub fn order_count(&self) -> usize {
        self.data.lock().unwrap().orders.len()
    }

    /// Backdate an order so history ordering can be checked.
    pub fn set_order_created_at(&self, order_id: Uuid, created_at: chrono::DateTime<Utc>) {
        let mut data = self.data.lock().unwrap();
        if let Some(order) = data.orders.iter_mut().find(|o| o.id == order_id) {
            order.created_at = created_at;
        }
    }
}

impl StoreData {
    fn listing(&self, product: &Product) -> Option<ProductListing> {
        let category = self
            .categories
            .iter()
            .find(|c| c.id == product.category_id)?;
        Some(ProductListing {
            product: product.clone(),
            category: category.clone(),
        })
    }

    fn new_cart(&mut self, user_id: Option<Uuid>) -> Cart {
        let now = Utc::now();
        let cart = Cart {
            id: Uuid::now_v7(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.carts.push(cart.clone());
        cart
    }
}

impl CatalogRepository for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreServiceError> {
        let mut categories = self.data.lock().unwrap().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductListing>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut products: Vec<&Product> = data
            .products
            .iter()
            .filter(|p| p.available)
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == id))
            .filter(|p| {
                needle.as_deref().is_none_or(|n| {
                    p.name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n)
                })
            })
            .collect();
        match filter.sort_by {
            ProductSortBy::Name(sort) => sort_by_key(&mut products, sort, |p| p.name.clone()),
            ProductSortBy::Price(sort) => sort_by_key(&mut products, sort, |p| p.price),
            ProductSortBy::CreatedAt(sort) => sort_by_key(&mut products, sort, |p| p.created_at),
        }
        Ok(products.into_iter().filter_map(|p| data.listing(p)).collect())
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_available_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductListing>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .products
            .iter()
            .find(|p| p.slug == slug && p.available)
            .and_then(|p| data.listing(p)))
    }

    async fn list_related(
        &self,
        product: &Product,
        limit: u64,
    ) -> Result<Vec<ProductListing>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        let mut related: Vec<&Product> = data
            .products
            .iter()
            .filter(|p| p.category_id == product.category_id && p.id != product.id && p.available)
            .collect();
        related.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(related
            .into_iter()
            .take(limit as usize)
            .filter_map(|p| data.listing(p))
            .collect())
    }
}

fn sort_by_key<K: Ord>(products: &mut [&Product], sort: Sort, key: impl Fn(&Product) -> K) {
    products.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id));
        match sort {
            Sort::Asc => ordering,
            Sort::Desc => ordering.reverse(),
        }
    });
}

impl CartRepository for MemoryStore {
    async fn find_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .carts
            .iter()
            .find(|c| c.user_id == Some(user_id))
            .cloned())
    }

    async fn find_anonymous_cart(&self, id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .carts
            .iter()
            .find(|c| c.id == id && c.user_id.is_none())
            .cloned())
    }

    async fn create_anonymous_cart(&self) -> Result<Cart, StoreServiceError> {
        Ok(self.data.lock().unwrap().new_cart(None))
    }

    async fn create_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let mut data = self.data.lock().unwrap();
        if data.carts.iter().any(|c| c.user_id == Some(user_id)) {
            return Ok(None);
        }
        Ok(Some(data.new_cart(Some(user_id))))
    }

    async fn create_user_cart_merging(
        &self,
        user_id: Uuid,
        anonymous_cart_id: Uuid,
    ) -> Result<Option<MergedCart>, StoreServiceError> {
        let mut data = self.data.lock().unwrap();
        if data.carts.iter().any(|c| c.user_id == Some(user_id)) {
            return Ok(None);
        }
        let cart = data.new_cart(Some(user_id));
        let source_exists = data
            .carts
            .iter()
            .any(|c| c.id == anonymous_cart_id && c.user_id.is_none());
        if !source_exists {
            return Ok(Some(MergedCart {
                cart,
                absorbed: None,
            }));
        }

        let target: Vec<CartItem> = data
            .items
            .iter()
            .filter(|i| i.cart_id == cart.id)
            .cloned()
            .collect();
        let source: Vec<CartItem> = data
            .items
            .iter()
            .filter(|i| i.cart_id == anonymous_cart_id)
            .cloned()
            .collect();
        let plan = plan_merge(&target, &source);
        for step in &plan {
            match *step {
                MergeStep::Increment { item_id, by } => {
                    if let Some(item) = data.items.iter_mut().find(|i| i.id == item_id) {
                        item.quantity += by;
                    }
                }
                MergeStep::Reparent { item_id } => {
                    if let Some(item) = data.items.iter_mut().find(|i| i.id == item_id) {
                        item.cart_id = cart.id;
                    }
                }
            }
        }
        data.items.retain(|i| i.cart_id != anonymous_cart_id);
        data.carts.retain(|c| c.id != anonymous_cart_id);
        Ok(Some(MergedCart {
            cart,
            absorbed: Some(plan.len()),
        }))
    }

    async fn list_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data
            .items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .filter_map(|item| {
                let product = data.products.iter().find(|p| p.id == item.product_id)?;
                Some(CartLine {
                    item_id: item.id,
                    product_id: product.id,
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    quantity: item.quantity,
                })
            })
            .collect())
    }

    async fn count_items(&self, cart_id: Uuid) -> Result<u64, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data.items.iter().filter(|i| i.cart_id == cart_id).count() as u64)
    }

    async fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), StoreServiceError> {
        let mut data = self.data.lock().unwrap();
        match data
            .items
            .iter()
            .position(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            Some(index) => {
                let item = &mut data.items[index];
                if item.quantity > MAX_LINE_QUANTITY - quantity {
                    return Err(StoreServiceError::InvalidQuantity);
                }
                item.quantity += quantity;
            }
            None => data.items.push(CartItem {
                id: Uuid::now_v7(),
                cart_id,
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    async fn remove_one(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, StoreServiceError> {
        let mut data = self.data.lock().unwrap();
        let Some(index) = data
            .items
            .iter()
            .position(|i| i.cart_id == cart_id && i.product_id == product_id)
        else {
            return Ok(false);
        };
        if data.items[index].quantity > 1 {
            data.items[index].quantity -= 1;
        } else {
            data.items.remove(index);
        }
        Ok(true)
    }
}

impl OrderRepository for MemoryStore {
    async fn place_order(
        &self,
        cart_id: Uuid,
        user_id: Uuid,
        shipping: &ValidShipping,
    ) -> Result<Option<Order>, StoreServiceError> {
        let mut data = self.data.lock().unwrap();
        let items: Vec<OrderItem> = data
            .items
            .iter()
            .filter(|i| i.cart_id == cart_id)
            .filter_map(|item| {
                let product = data.products.iter().find(|p| p.id == item.product_id)?;
                Some(OrderItem {
                    id: Uuid::now_v7(),
                    product_id: Some(product.id),
                    product_name: product.name.clone(),
                    price: product.price,
                    quantity: item.quantity,
                })
            })
            .collect();
        if items.is_empty() {
            return Ok(None);
        }
        let order = Order {
            id: Uuid::now_v7(),
            user_id,
            first_name: shipping.first_name.clone(),
            last_name: shipping.last_name.clone(),
            email: shipping.email.clone(),
            address: shipping.address.clone(),
            postal_code: shipping.postal_code.clone(),
            city: shipping.city.clone(),
            items,
            created_at: Utc::now(),
        };
        data.items.retain(|i| i.cart_id != cart_id);
        data.orders.push(order.clone());
        Ok(Some(order))
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        Ok(data.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, StoreServiceError> {
        let data = self.data.lock().unwrap();
        let mut orders: Vec<Order> = data
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(orders
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }
}

impl ProfileRepository for MemoryStore {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, StoreServiceError> {
        Ok(self.data.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), StoreServiceError> {
        self.data
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        first_name: "Grace".to_owned(),
        last_name: "Hopper".to_owned(),
        email: "grace@example.com".to_owned(),
        address: "1 Navy Yard".to_owned(),
        postal_code: "20374".to_owned(),
        city: "Washington".to_owned(),
    }
}
