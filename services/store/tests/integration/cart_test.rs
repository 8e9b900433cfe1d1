use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_store::domain::types::{
    CartContext, CartResolution, MAX_LINE_QUANTITY, SessionAction,
};
use storefront_store::error::StoreServiceError;
use storefront_store::usecase::cart::{
    AddToCartInput, AddToCartUseCase, GetCartUseCase, RemoveFromCartUseCase, ResolveCartUseCase,
};

use crate::helpers::MemoryStore;

fn add_usecase(store: &MemoryStore) -> AddToCartUseCase<MemoryStore, MemoryStore> {
    AddToCartUseCase {
        carts: store.clone(),
        catalog: store.clone(),
        reject_unavailable: false,
    }
}

fn remove_usecase(store: &MemoryStore) -> RemoveFromCartUseCase<MemoryStore, MemoryStore> {
    RemoveFromCartUseCase {
        carts: store.clone(),
        catalog: store.clone(),
    }
}

/// Add to an anonymous cart and return the cart token handed out for it.
async fn anonymous_add(
    store: &MemoryStore,
    token: Option<Uuid>,
    product_id: Uuid,
    quantity: i32,
) -> Uuid {
    let added = add_usecase(store)
        .execute(
            &CartContext::anonymous(token),
            AddToCartInput {
                product_id,
                quantity,
            },
        )
        .await
        .unwrap();
    match added.resolved.session {
        SessionAction::Set(token) => token,
        _ => added.resolved.cart.id,
    }
}

#[tokio::test]
async fn should_sum_quantities_when_adding_same_product_twice() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);

    let token = anonymous_add(&store, None, lamp.id, 2).await;
    let added = add_usecase(&store)
        .execute(
            &CartContext::anonymous(Some(token)),
            AddToCartInput {
                product_id: lamp.id,
                quantity: 3,
            },
        )
        .await
        .unwrap();

    assert_eq!(added.resolved.resolution, CartResolution::Found);
    assert_eq!(added.resolved.session, SessionAction::Keep);
    assert_eq!(added.product_name, "Desk Lamp");
    assert_eq!(added.totals.item_count, 5);
    assert_eq!(added.totals.total, Decimal::new(5000, 2));

    let items = store.items_of(token);
    assert_eq!(items.len(), 1, "one line per product");
    assert_eq!(items[0].quantity, 5);
}

#[tokio::test]
async fn should_hand_out_new_cart_for_stale_token() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let stale = Uuid::now_v7();

    let token = anonymous_add(&store, Some(stale), lamp.id, 1).await;
    assert_ne!(token, stale);
    assert!(store.cart(token).unwrap().is_anonymous());
}

#[tokio::test]
async fn should_reject_quantity_below_one() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);

    let result = add_usecase(&store)
        .execute(
            &CartContext::anonymous(None),
            AddToCartInput {
                product_id: lamp.id,
                quantity: 0,
            },
        )
        .await;
    assert!(
        matches!(result, Err(StoreServiceError::InvalidQuantity)),
        "expected InvalidQuantity, got {result:?}"
    );
    assert!(store.data.lock().unwrap().carts.is_empty(), "no cart created");
}

#[tokio::test]
async fn should_refuse_add_that_pushes_line_past_maximum() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let token = anonymous_add(&store, None, lamp.id, MAX_LINE_QUANTITY - 1).await;
    let ctx = CartContext::anonymous(Some(token));

    let result = add_usecase(&store)
        .execute(
            &ctx,
            AddToCartInput {
                product_id: lamp.id,
                quantity: 2,
            },
        )
        .await;
    assert!(
        matches!(result, Err(StoreServiceError::InvalidQuantity)),
        "expected InvalidQuantity, got {result:?}"
    );
    assert_eq!(store.items_of(token)[0].quantity, MAX_LINE_QUANTITY - 1);

    let added = add_usecase(&store)
        .execute(
            &ctx,
            AddToCartInput {
                product_id: lamp.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(added.totals.item_count, MAX_LINE_QUANTITY as u64);
}

#[tokio::test]
async fn should_return_product_not_found_for_unknown_product() {
    let store = MemoryStore::new();
    let result = add_usecase(&store)
        .execute(
            &CartContext::anonymous(None),
            AddToCartInput {
                product_id: Uuid::now_v7(),
                quantity: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(StoreServiceError::ProductNotFound)));

    let result = remove_usecase(&store)
        .execute(&CartContext::anonymous(None), Uuid::now_v7())
        .await;
    assert!(matches!(result, Err(StoreServiceError::ProductNotFound)));
}

#[tokio::test]
async fn should_gate_unavailable_products_on_configuration() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    store.set_available(lamp.id, false);

    anonymous_add(&store, None, lamp.id, 1).await;

    let strict = AddToCartUseCase {
        carts: store.clone(),
        catalog: store.clone(),
        reject_unavailable: true,
    };
    let result = strict
        .execute(
            &CartContext::anonymous(None),
            AddToCartInput {
                product_id: lamp.id,
                quantity: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(StoreServiceError::ProductUnavailable)));
}

#[tokio::test]
async fn should_decrement_then_delete_line() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let token = anonymous_add(&store, None, lamp.id, 2).await;
    let ctx = CartContext::anonymous(Some(token));

    let removed = remove_usecase(&store).execute(&ctx, lamp.id).await.unwrap();
    assert!(removed.found);
    assert_eq!(removed.totals.item_count, 1);
    assert_eq!(store.items_of(token)[0].quantity, 1);

    let removed = remove_usecase(&store).execute(&ctx, lamp.id).await.unwrap();
    assert!(removed.found);
    assert_eq!(removed.totals.item_count, 0);
    assert_eq!(removed.totals.total, Decimal::ZERO);
    assert!(store.items_of(token).is_empty(), "line deleted at zero");
}

#[tokio::test]
async fn should_report_missing_line_without_changing_cart() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let shade = store.add_product(&lamps, "Lamp Shade", 500);
    let token = anonymous_add(&store, None, lamp.id, 1).await;

    let removed = remove_usecase(&store)
        .execute(&CartContext::anonymous(Some(token)), shade.id)
        .await
        .unwrap();
    assert!(!removed.found);
    assert_eq!(removed.totals.item_count, 1);
    assert_eq!(removed.totals.total, Decimal::new(1000, 2));
}

#[tokio::test]
async fn should_price_cart_at_current_product_price() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let token = anonymous_add(&store, None, lamp.id, 2).await;

    store.set_price(lamp.id, 1250);

    let view = GetCartUseCase {
        carts: store.clone(),
    }
    .execute(&CartContext::anonymous(Some(token)))
    .await
    .unwrap();
    assert_eq!(view.summary.lines[0].unit_price, Decimal::new(1250, 2));
    assert_eq!(view.summary.total(), Decimal::new(2500, 2));
    assert_eq!(view.summary.item_count(), 2);
}

#[tokio::test]
async fn should_merge_anonymous_cart_on_first_login() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let shade = store.add_product(&lamps, "Lamp Shade", 500);
    let token = anonymous_add(&store, None, lamp.id, 2).await;
    anonymous_add(&store, Some(token), shade.id, 1).await;

    let user_id = Uuid::now_v7();
    let resolved = ResolveCartUseCase {
        carts: store.clone(),
    }
    .execute(&CartContext::user(user_id, Some(token)))
    .await
    .unwrap();

    assert_eq!(resolved.resolution, CartResolution::Merged { absorbed: 2 });
    assert_eq!(resolved.session, SessionAction::Clear);
    assert_eq!(resolved.cart.user_id, Some(user_id));
    assert!(store.cart(token).is_none(), "anonymous cart deleted");

    let items = store.items_of(resolved.cart.id);
    assert_eq!(items.len(), 2);
    let lamp_line = items.iter().find(|i| i.product_id == lamp.id).unwrap();
    assert_eq!(lamp_line.quantity, 2);
}

#[tokio::test]
async fn should_abandon_anonymous_cart_when_user_already_has_one() {
    let store = MemoryStore::new();
    let lamps = store.add_category("Lamps", "lamps");
    let lamp = store.add_product(&lamps, "Desk Lamp", 1000);
    let shade = store.add_product(&lamps, "Lamp Shade", 500);
    let user_id = Uuid::now_v7();

    let user_cart = add_usecase(&store)
        .execute(
            &CartContext::user(user_id, None),
            AddToCartInput {
                product_id: lamp.id,
                quantity: 1,
            },
        )
        .await
        .unwrap()
        .resolved
        .cart;
    let token = anonymous_add(&store, None, shade.id, 3).await;

    let resolved = ResolveCartUseCase {
        carts: store.clone(),
    }
    .execute(&CartContext::user(user_id, Some(token)))
    .await
    .unwrap();

    assert_eq!(resolved.resolution, CartResolution::Found);
    assert_eq!(resolved.session, SessionAction::Keep);
    assert_eq!(resolved.cart.id, user_cart.id);
    let items = store.items_of(user_cart.id);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, lamp.id);
    assert_eq!(store.items_of(token).len(), 1, "anonymous cart left untouched");
}

#[tokio::test]
async fn should_resolve_same_user_cart_every_time() {
    let store = MemoryStore::new();
    let user_id = Uuid::now_v7();
    let uc = ResolveCartUseCase {
        carts: store.clone(),
    };

    let first = uc.execute(&CartContext::user(user_id, None)).await.unwrap();
    let second = uc.execute(&CartContext::user(user_id, None)).await.unwrap();

    assert_eq!(first.resolution, CartResolution::Created);
    assert_eq!(second.resolution, CartResolution::Found);
    assert_eq!(first.cart.id, second.cart.id);
    assert_eq!(store.data.lock().unwrap().carts.len(), 1);
}
