use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, DbErr, DeleteMany, EntityTrait, Insert,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, UpdateMany,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use storefront_core::sea_ext::contains_ignore_case;
use storefront_domain::catalog::ProductSortBy;
use storefront_domain::pagination::{PageRequest, Sort};
use storefront_store_schema::{
    cart_items, carts, categories, order_items, orders, products, profiles,
};

use crate::domain::repository::{
    CartRepository, CatalogRepository, OrderRepository, ProfileRepository,
};
use crate::domain::types::{
    Cart, CartItem, CartLine, Category, MAX_LINE_QUANTITY, MergeStep, MergedCart, Order,
    OrderItem, Product, ProductFilter, ProductListing, Profile, ValidShipping, plan_merge,
};
use crate::error::StoreServiceError;

// ── Catalog repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCatalogRepository {
    pub db: DatabaseConnection,
}

impl CatalogRepository for DbCatalogRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, StoreServiceError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, StoreServiceError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find category by slug")?;
        Ok(model.map(category_from_model))
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductListing>, StoreServiceError> {
        let mut query = products::Entity::find()
            .find_also_related(categories::Entity)
            .filter(products::Column::Available.eq(true));
        if let Some(category_id) = filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = filter.search.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(contains_ignore_case(
                        (products::Entity, products::Column::Name),
                        search,
                    ))
                    .add(contains_ignore_case(
                        (products::Entity, products::Column::Description),
                        search,
                    )),
            );
        }
        query = match filter.sort_by {
            ProductSortBy::Name(Sort::Asc) => query.order_by_asc(products::Column::Name),
            ProductSortBy::Name(Sort::Desc) => query.order_by_desc(products::Column::Name),
            ProductSortBy::Price(Sort::Asc) => query.order_by_asc(products::Column::Price),
            ProductSortBy::Price(Sort::Desc) => query.order_by_desc(products::Column::Price),
            ProductSortBy::CreatedAt(Sort::Asc) => {
                query.order_by_asc(products::Column::CreatedAt)
            }
            ProductSortBy::CreatedAt(Sort::Desc) => {
                query.order_by_desc(products::Column::CreatedAt)
            }
        };
        let rows = query
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await
            .context("list products")?;
        rows.into_iter()
            .map(|(product, category)| listing_from_models(product, category))
            .collect()
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, StoreServiceError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn find_available_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductListing>, StoreServiceError> {
        let row = products::Entity::find()
            .find_also_related(categories::Entity)
            .filter(products::Column::Slug.eq(slug))
            .filter(products::Column::Available.eq(true))
            .one(&self.db)
            .await
            .context("find available product by slug")?;
        row.map(|(product, category)| listing_from_models(product, category))
            .transpose()
    }

    async fn list_related(
        &self,
        product: &Product,
        limit: u64,
    ) -> Result<Vec<ProductListing>, StoreServiceError> {
        let rows = products::Entity::find()
            .find_also_related(categories::Entity)
            .filter(products::Column::CategoryId.eq(product.category_id))
            .filter(products::Column::Id.ne(product.id))
            .filter(products::Column::Available.eq(true))
            .order_by_asc(products::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list related products")?;
        rows.into_iter()
            .map(|(product, category)| listing_from_models(product, category))
            .collect()
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        category_id: model.category_id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        available: model.available,
        image: model.image,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn listing_from_models(
    product: products::Model,
    category: Option<categories::Model>,
) -> Result<ProductListing, StoreServiceError> {
    let category = category.with_context(|| format!("category of product {}", product.id))?;
    Ok(ProductListing {
        product: product_from_model(product),
        category: category_from_model(category),
    })
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

impl CartRepository for DbCartRepository {
    async fn find_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let model = carts::Entity::find()
            .filter(carts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find user cart")?;
        Ok(model.map(cart_from_model))
    }

    async fn find_anonymous_cart(&self, id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let model = carts::Entity::find_by_id(id)
            .filter(carts::Column::UserId.is_null())
            .one(&self.db)
            .await
            .context("find anonymous cart")?;
        Ok(model.map(cart_from_model))
    }

    async fn create_anonymous_cart(&self) -> Result<Cart, StoreServiceError> {
        let now = Utc::now();
        let model = carts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create anonymous cart")?;
        Ok(cart_from_model(model))
    }

    async fn create_user_cart(&self, user_id: Uuid) -> Result<Option<Cart>, StoreServiceError> {
        let cart = insert_user_cart(&self.db, user_id)
            .await
            .context("create user cart")?;
        Ok(cart)
    }

    async fn create_user_cart_merging(
        &self,
        user_id: Uuid,
        anonymous_cart_id: Uuid,
    ) -> Result<Option<MergedCart>, StoreServiceError> {
        let merged = self
            .db
            .transaction::<_, Option<MergedCart>, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(cart) = insert_user_cart(txn, user_id).await? else {
                        return Ok(None);
                    };
                    let absorbed = absorb_anonymous_cart(txn, cart.id, anonymous_cart_id).await?;
                    Ok(Some(MergedCart { cart, absorbed }))
                })
            })
            .await
            .context("create user cart merging anonymous cart")?;
        Ok(merged)
    }

    async fn list_lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, StoreServiceError> {
        let rows = cart_items::Entity::find()
            .find_also_related(products::Entity)
            .filter(cart_items::Column::CartId.eq(cart_id))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cart lines")?;
        rows.into_iter()
            .map(|(item, product)| {
                let product =
                    product.with_context(|| format!("product of cart item {}", item.id))?;
                Ok(CartLine {
                    item_id: item.id,
                    product_id: product.id,
                    product_name: product.name,
                    unit_price: product.price,
                    quantity: item.quantity,
                })
            })
            .collect()
    }

    async fn count_items(&self, cart_id: Uuid) -> Result<u64, StoreServiceError> {
        let count = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id))
            .count(&self.db)
            .await
            .context("count cart items")?;
        Ok(count)
    }

    async fn add_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), StoreServiceError> {
        let written = upsert_item(cart_id, product_id, quantity)
            .exec_without_returning(&self.db)
            .await
            .context("upsert cart item")?;
        // The conflict update is skipped when the sum would pass the cap.
        if written == 0 {
            return Err(StoreServiceError::InvalidQuantity);
        }
        touch_cart(&self.db, cart_id)
            .await
            .context("touch cart")?;
        Ok(())
    }

    async fn remove_one(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, StoreServiceError> {
        let found = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(item) = locked_line(cart_id, product_id).one(txn).await? else {
                        return Ok(false);
                    };
                    if item.quantity > 1 {
                        decrement_item(item.id).exec(txn).await?;
                    } else {
                        cart_items::Entity::delete_by_id(item.id).exec(txn).await?;
                    }
                    touch_cart(txn, cart_id).await?;
                    Ok(true)
                })
            })
            .await
            .context("remove one cart item")?;
        Ok(found)
    }
}

/// Insert the user's cart unless one exists. `None` means another cart won.
async fn insert_user_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Option<Cart>, DbErr> {
    let now = Utc::now();
    let cart = Cart {
        id: Uuid::now_v7(),
        user_id: Some(user_id),
        created_at: now,
        updated_at: now,
    };
    let inserted = insert_user_cart_if_absent(&cart)
        .exec_without_returning(conn)
        .await?;
    Ok((inserted > 0).then_some(cart))
}

/// Fold the anonymous cart into `target_id` and delete it.
///
/// Returns the number of merge steps applied, or `None` if the anonymous cart
/// no longer exists or has been claimed.
async fn absorb_anonymous_cart(
    txn: &DatabaseTransaction,
    target_id: Uuid,
    source_id: Uuid,
) -> Result<Option<usize>, DbErr> {
    let source = locked_anonymous_cart(source_id).one(txn).await?;
    if source.is_none() {
        return Ok(None);
    }

    let target_items: Vec<CartItem> = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(target_id))
        .all(txn)
        .await?
        .into_iter()
        .map(cart_item_from_model)
        .collect();
    let source_items: Vec<CartItem> = locked_cart_items(source_id)
        .all(txn)
        .await?
        .into_iter()
        .map(cart_item_from_model)
        .collect();

    let plan = plan_merge(&target_items, &source_items);
    for step in &plan {
        apply_merge_step(*step, target_id).exec(txn).await?;
    }
    // Remaining source items cascade with the cart.
    carts::Entity::delete_by_id(source_id).exec(txn).await?;
    Ok(Some(plan.len()))
}

async fn touch_cart<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> Result<(), DbErr> {
    carts::Entity::update_many()
        .col_expr(carts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(carts::Column::Id.eq(cart_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Add `quantity` to the `(cart, product)` line, creating it if absent. The
/// conflict update only fires while the sum stays within `MAX_LINE_QUANTITY`.
fn upsert_item(cart_id: Uuid, product_id: Uuid, quantity: i32) -> Insert<cart_items::ActiveModel> {
    let summed = Expr::col((cart_items::Entity, cart_items::Column::Quantity)).add(quantity);
    cart_items::Entity::insert(cart_items::ActiveModel {
        id: Set(Uuid::now_v7()),
        cart_id: Set(cart_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([cart_items::Column::CartId, cart_items::Column::ProductId])
            .value(cart_items::Column::Quantity, summed.clone())
            .action_and_where(Expr::expr(summed).lte(MAX_LINE_QUANTITY))
            .to_owned(),
    )
}

fn insert_user_cart_if_absent(cart: &Cart) -> Insert<carts::ActiveModel> {
    carts::Entity::insert(carts::ActiveModel {
        id: Set(cart.id),
        user_id: Set(cart.user_id),
        created_at: Set(cart.created_at),
        updated_at: Set(cart.updated_at),
    })
    .on_conflict(
        OnConflict::column(carts::Column::UserId)
            .do_nothing()
            .to_owned(),
    )
}

fn locked_anonymous_cart(id: Uuid) -> Select<carts::Entity> {
    carts::Entity::find_by_id(id)
        .filter(carts::Column::UserId.is_null())
        .lock_exclusive()
}

fn locked_line(cart_id: Uuid, product_id: Uuid) -> Select<cart_items::Entity> {
    cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .filter(cart_items::Column::ProductId.eq(product_id))
        .lock_exclusive()
}

// Row locks only; FOR UPDATE cannot apply to the nullable side of a product join.
fn locked_cart_items(cart_id: Uuid) -> Select<cart_items::Entity> {
    cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .order_by_asc(cart_items::Column::CreatedAt)
        .lock_exclusive()
}

fn decrement_item(item_id: Uuid) -> UpdateMany<cart_items::Entity> {
    cart_items::Entity::update_many()
        .col_expr(
            cart_items::Column::Quantity,
            Expr::col(cart_items::Column::Quantity).sub(1),
        )
        .filter(cart_items::Column::Id.eq(item_id))
}

fn apply_merge_step(step: MergeStep, target_id: Uuid) -> UpdateMany<cart_items::Entity> {
    let update = cart_items::Entity::update_many();
    let (update, item_id) = match step {
        MergeStep::Increment { item_id, by } => (
            update.col_expr(
                cart_items::Column::Quantity,
                Expr::col(cart_items::Column::Quantity).add(by),
            ),
            item_id,
        ),
        MergeStep::Reparent { item_id } => (
            update.col_expr(cart_items::Column::CartId, Expr::value(target_id)),
            item_id,
        ),
    };
    update.filter(cart_items::Column::Id.eq(item_id))
}

fn clear_cart_items(cart_id: Uuid) -> DeleteMany<cart_items::Entity> {
    cart_items::Entity::delete_many().filter(cart_items::Column::CartId.eq(cart_id))
}

fn cart_from_model(model: carts::Model) -> Cart {
    Cart {
        id: model.id,
        user_id: model.user_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn cart_item_from_model(model: cart_items::Model) -> CartItem {
    CartItem {
        id: model.id,
        cart_id: model.cart_id,
        product_id: model.product_id,
        quantity: model.quantity,
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn place_order(
        &self,
        cart_id: Uuid,
        user_id: Uuid,
        shipping: &ValidShipping,
    ) -> Result<Option<Order>, StoreServiceError> {
        let shipping = shipping.clone();
        let order = self
            .db
            .transaction::<_, Option<Order>, DbErr>(move |txn| {
                Box::pin(async move {
                    let items = locked_cart_items(cart_id).all(txn).await?;
                    if items.is_empty() {
                        return Ok(None);
                    }
                    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
                    let products: HashMap<Uuid, products::Model> = products::Entity::find()
                        .filter(products::Column::Id.is_in(product_ids))
                        .all(txn)
                        .await?
                        .into_iter()
                        .map(|p| (p.id, p))
                        .collect();

                    let order_id = Uuid::now_v7();
                    let created_at = Utc::now();
                    orders::ActiveModel {
                        id: Set(order_id),
                        user_id: Set(user_id),
                        first_name: Set(shipping.first_name.clone()),
                        last_name: Set(shipping.last_name.clone()),
                        email: Set(shipping.email.clone()),
                        address: Set(shipping.address.clone()),
                        postal_code: Set(shipping.postal_code.clone()),
                        city: Set(shipping.city.clone()),
                        created_at: Set(created_at),
                    }
                    .insert(txn)
                    .await?;

                    let mut order_items = Vec::with_capacity(items.len());
                    for item in &items {
                        let Some(product) = products.get(&item.product_id) else {
                            continue;
                        };
                        let order_item = OrderItem {
                            id: Uuid::now_v7(),
                            product_id: Some(product.id),
                            product_name: product.name.clone(),
                            price: product.price,
                            quantity: item.quantity,
                        };
                        order_items::ActiveModel {
                            id: Set(order_item.id),
                            order_id: Set(order_id),
                            product_id: Set(order_item.product_id),
                            product_name: Set(order_item.product_name.clone()),
                            price: Set(order_item.price),
                            quantity: Set(order_item.quantity),
                        }
                        .insert(txn)
                        .await?;
                        order_items.push(order_item);
                    }

                    clear_cart_items(cart_id).exec(txn).await?;

                    Ok(Some(Order {
                        id: order_id,
                        user_id,
                        first_name: shipping.first_name,
                        last_name: shipping.last_name,
                        email: shipping.email,
                        address: shipping.address,
                        postal_code: shipping.postal_code,
                        city: shipping.city,
                        items: order_items,
                        created_at,
                    }))
                })
            })
            .await
            .context("place order")?;
        Ok(order)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, StoreServiceError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order")?
        else {
            return Ok(None);
        };
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.eq(model.id))
            .order_by_asc(order_items::Column::Id)
            .all(&self.db)
            .await
            .context("list order items")?;
        Ok(Some(order_from_models(model, items)))
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, StoreServiceError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list orders")?;
        if models.is_empty() {
            return Ok(vec![]);
        }

        let order_ids: Vec<Uuid> = models.iter().map(|o| o.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<order_items::Model>> = HashMap::new();
        for item in order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(order_ids))
            .order_by_asc(order_items::Column::Id)
            .all(&self.db)
            .await
            .context("list order items for orders")?
        {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let items = items_by_order.remove(&model.id).unwrap_or_default();
                order_from_models(model, items)
            })
            .collect())
    }
}

fn order_from_models(model: orders::Model, items: Vec<order_items::Model>) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        address: model.address,
        postal_code: model.postal_code,
        city: model.city,
        items: items
            .into_iter()
            .map(|item| OrderItem {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                price: item.price,
                quantity: item.quantity,
            })
            .collect(),
        created_at: model.created_at,
    }
}

// ── Profile repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProfileRepository {
    pub db: DatabaseConnection,
}

impl ProfileRepository for DbProfileRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, StoreServiceError> {
        let model = profiles::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find profile")?;
        Ok(model.map(|m| Profile {
            user_id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            updated_at: m.updated_at,
        }))
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), StoreServiceError> {
        profiles::Entity::insert(profiles::ActiveModel {
            user_id: Set(profile.user_id),
            first_name: Set(profile.first_name.clone()),
            last_name: Set(profile.last_name.clone()),
            email: Set(profile.email.clone()),
            updated_at: Set(profile.updated_at),
        })
        .on_conflict(
            OnConflict::column(profiles::Column::UserId)
                .update_columns([
                    profiles::Column::FirstName,
                    profiles::Column::LastName,
                    profiles::Column::Email,
                    profiles::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("upsert profile")?;
        Ok(())
    }
}
