use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_domain::pagination::PageRequest;
use storefront_store::domain::types::{CartContext, ShippingInfo};
use storefront_store::error::StoreServiceError;
use storefront_store::usecase::cart::{AddToCartInput, AddToCartUseCase};
use storefront_store::usecase::checkout::{CheckoutUseCase, GetCheckoutUseCase};
use storefront_store::usecase::order::{GetOrderUseCase, GetOrdersUseCase};
use storefront_store::usecase::profile::{UpdateProfileInput, UpdateProfileUseCase};

use crate::helpers::{MemoryStore, shipping};

async fn add(store: &MemoryStore, user_id: Uuid, product_id: Uuid, quantity: i32) {
    AddToCartUseCase {
        carts: store.clone(),
        catalog: store.clone(),
        reject_unavailable: false,
    }
    .execute(
        &CartContext::user(user_id, None),
        AddToCartInput {
            product_id,
            quantity,
        },
    )
    .await
    .unwrap();
}

fn checkout_usecase(store: &MemoryStore) -> CheckoutUseCase<MemoryStore, MemoryStore> {
    CheckoutUseCase {
        carts: store.clone(),
        orders: store.clone(),
    }
}

#[tokio::test]
async fn should_place_order_with_snapshot_prices_and_empty_cart() {
    let store = MemoryStore::new();
    let office = store.add_category("Office", "office");
    let a = store.add_product(&office, "Stapler", 1000);
    let b = store.add_product(&office, "Pencil", 500);
    let user_id = Uuid::now_v7();
    add(&store, user_id, a.id, 2).await;
    add(&store, user_id, b.id, 1).await;

    let placed = checkout_usecase(&store)
        .execute(user_id, None, shipping())
        .await
        .unwrap();

    let order = &placed.order;
    assert_eq!(order.user_id, user_id);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total(), Decimal::new(2500, 2));
    let stapler = order.items.iter().find(|i| i.product_id == Some(a.id)).unwrap();
    assert_eq!(stapler.price, Decimal::new(1000, 2));
    assert_eq!(stapler.quantity, 2);
    assert_eq!(stapler.product_name, "Stapler");
    assert!(store.items_of(placed.resolved.cart.id).is_empty(), "cart emptied");
    assert!(store.cart(placed.resolved.cart.id).is_some(), "cart kept");

    // Later price changes do not touch placed orders.
    store.set_price(a.id, 9900);
    let reloaded = GetOrderUseCase {
        repo: store.clone(),
    }
    .execute(user_id, order.id)
    .await
    .unwrap();
    assert_eq!(reloaded.total(), Decimal::new(2500, 2));
}

#[tokio::test]
async fn should_reject_checkout_of_empty_cart() {
    let store = MemoryStore::new();
    let result = checkout_usecase(&store)
        .execute(Uuid::now_v7(), None, shipping())
        .await;
    assert!(
        matches!(result, Err(StoreServiceError::EmptyCart)),
        "expected EmptyCart, got {result:?}"
    );
    assert_eq!(store.order_count(), 0);
}

#[tokio::test]
async fn should_check_cart_before_shipping() {
    let store = MemoryStore::new();
    let result = checkout_usecase(&store)
        .execute(Uuid::now_v7(), None, ShippingInfo::default())
        .await;
    assert!(matches!(result, Err(StoreServiceError::EmptyCart)));
}

#[tokio::test]
async fn should_report_every_invalid_field_and_write_nothing() {
    let store = MemoryStore::new();
    let office = store.add_category("Office", "office");
    let a = store.add_product(&office, "Stapler", 1000);
    let user_id = Uuid::now_v7();
    add(&store, user_id, a.id, 1).await;

    let submitted = ShippingInfo {
        first_name: "  ".to_owned(),
        email: "not-an-email".to_owned(),
        postal_code: "1".repeat(21),
        ..shipping()
    };
    let result = checkout_usecase(&store)
        .execute(user_id, None, submitted.clone())
        .await;

    let errors = match result {
        Err(StoreServiceError::InvalidShipping(errors)) => errors,
        other => panic!("expected InvalidShipping, got {other:?}"),
    };
    assert_eq!(errors.errors.len(), 3);
    assert_eq!(errors.errors["first_name"], "This field is required.");
    assert_eq!(errors.errors["email"], "Enter a valid email address.");
    assert_eq!(
        errors.errors["postal_code"],
        "Ensure this value is not too long."
    );
    assert_eq!(errors.submitted, submitted);
    assert_eq!(store.order_count(), 0);

    let cart = store
        .data
        .lock()
        .unwrap()
        .carts
        .iter()
        .find(|c| c.user_id == Some(user_id))
        .cloned()
        .unwrap();
    assert_eq!(store.items_of(cart.id).len(), 1, "cart untouched");
}

#[tokio::test]
async fn should_merge_anonymous_cart_at_checkout() {
    let store = MemoryStore::new();
    let office = store.add_category("Office", "office");
    let a = store.add_product(&office, "Stapler", 1000);
    let anonymous = AddToCartUseCase {
        carts: store.clone(),
        catalog: store.clone(),
        reject_unavailable: false,
    }
    .execute(
        &CartContext::anonymous(None),
        AddToCartInput {
            product_id: a.id,
            quantity: 3,
        },
    )
    .await
    .unwrap();
    let token = anonymous.resolved.cart.id;

    let placed = checkout_usecase(&store)
        .execute(Uuid::now_v7(), Some(token), shipping())
        .await
        .unwrap();
    assert_eq!(placed.order.items[0].quantity, 3);
    assert!(store.cart(token).is_none());
}

#[tokio::test]
async fn should_prefill_checkout_from_profile() {
    let store = MemoryStore::new();
    let office = store.add_category("Office", "office");
    let a = store.add_product(&office, "Stapler", 1000);
    let user_id = Uuid::now_v7();
    add(&store, user_id, a.id, 1).await;
    UpdateProfileUseCase {
        repo: store.clone(),
    }
    .execute(
        user_id,
        UpdateProfileInput {
            first_name: Some("Ada".to_owned()),
            email: Some("ada@example.com".to_owned()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let view = GetCheckoutUseCase {
        carts: store.clone(),
        profiles: store.clone(),
    }
    .execute(user_id, None)
    .await
    .unwrap();
    assert_eq!(view.summary.item_count(), 1);
    assert_eq!(view.prefill.first_name, "Ada");
    assert_eq!(view.prefill.email, "ada@example.com");
}

#[tokio::test]
async fn should_list_own_orders_newest_first() {
    let store = MemoryStore::new();
    let office = store.add_category("Office", "office");
    let a = store.add_product(&office, "Stapler", 1000);
    let user_id = Uuid::now_v7();
    let other_id = Uuid::now_v7();

    let mut placed = vec![];
    for days_ago in [3, 1, 2] {
        add(&store, user_id, a.id, 1).await;
        let order = checkout_usecase(&store)
            .execute(user_id, None, shipping())
            .await
            .unwrap()
            .order;
        store.set_order_created_at(order.id, Utc::now() - Duration::days(days_ago));
        placed.push(order.id);
    }
    add(&store, other_id, a.id, 1).await;
    let foreign = checkout_usecase(&store)
        .execute(other_id, None, shipping())
        .await
        .unwrap()
        .order;

    let orders = GetOrdersUseCase {
        repo: store.clone(),
    }
    .execute(user_id, PageRequest::default())
    .await
    .unwrap();
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![placed[1], placed[2], placed[0]]);

    let page = GetOrdersUseCase {
        repo: store.clone(),
    }
    .execute(
        user_id,
        PageRequest {
            per_page: 2,
            page: 2,
        },
    )
    .await
    .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, placed[0]);

    let result = GetOrderUseCase {
        repo: store.clone(),
    }
    .execute(user_id, foreign.id)
    .await;
    assert!(matches!(result, Err(StoreServiceError::OrderNotFound)));
}
