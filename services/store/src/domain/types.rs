use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use storefront_domain::catalog::ProductSortBy;

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub available: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product together with the category it is listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductListing {
    pub product: Product,
    pub category: Category,
}

/// Filters for catalog listings. Only available products are ever listed.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
    pub sort_by: ProductSortBy,
}

// ── Cart ─────────────────────────────────────────────────────────────────────

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 9_999;

/// A cart. `user_id = None` means the cart belongs to an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A cart item joined with the live product name and price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl CartLine {
    pub fn cost(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Contents of a cart priced at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    pub fn item_count(&self) -> u64 {
        self.lines.iter().fold(0u64, |count, l| {
            count.saturating_add(u64::try_from(l.quantity).unwrap_or(0))
        })
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::cost).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self.item_count(),
            total: self.total(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: u64,
    pub total: Decimal,
}

// ── Cart resolution ──────────────────────────────────────────────────────────

/// Who is asking for a cart: the gateway identity and the cart-session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartContext {
    pub user_id: Option<Uuid>,
    pub cart_token: Option<Uuid>,
}

impl CartContext {
    pub fn anonymous(cart_token: Option<Uuid>) -> Self {
        Self {
            user_id: None,
            cart_token,
        }
    }

    pub fn user(user_id: Uuid, cart_token: Option<Uuid>) -> Self {
        Self {
            user_id: Some(user_id),
            cart_token,
        }
    }
}

/// How the cart of a request came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartResolution {
    Found,
    Created,
    /// The anonymous cart was folded into a newly created user cart.
    Merged { absorbed: usize },
}

/// What the caller must do with the cart-session token afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Keep,
    Set(Uuid),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCart {
    pub cart: Cart,
    pub resolution: CartResolution,
    pub session: SessionAction,
}

/// Result of creating a user cart from an anonymous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCart {
    pub cart: Cart,
    /// Number of anonymous cart items folded in; `None` if the anonymous cart
    /// was already gone.
    pub absorbed: Option<usize>,
}

/// One write needed to fold an anonymous cart into a user cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    /// Add `by` to an item the target cart already holds.
    Increment { item_id: Uuid, by: i32 },
    /// Move a source item to the target cart.
    Reparent { item_id: Uuid },
}

/// Plan how `source` items fold into `target`: quantities are summed for
/// products present in both, every other source item changes carts.
/// Summed quantities stop at [`MAX_LINE_QUANTITY`].
pub fn plan_merge(target: &[CartItem], source: &[CartItem]) -> Vec<MergeStep> {
    let existing: HashMap<Uuid, &CartItem> = target
        .iter()
        .map(|item| (item.product_id, item))
        .collect();
    source
        .iter()
        .map(|item| match existing.get(&item.product_id) {
            Some(held) => MergeStep::Increment {
                item_id: held.id,
                by: item
                    .quantity
                    .min(MAX_LINE_QUANTITY.saturating_sub(held.quantity))
                    .max(0),
            },
            None => MergeStep::Reparent { item_id: item.id },
        })
        .collect()
}

// ── Checkout ─────────────────────────────────────────────────────────────────

const FIRST_NAME_MAX: usize = 50;
const LAST_NAME_MAX: usize = 50;
const EMAIL_MAX: usize = 254;
const ADDRESS_MAX: usize = 250;
const POSTAL_CODE_MAX: usize = 20;
const CITY_MAX: usize = 100;

/// Shipping details exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
}

/// Shipping details that passed validation, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidShipping {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
}

/// Per-field validation failures plus the submitted values for redisplay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingErrors {
    pub errors: BTreeMap<&'static str, &'static str>,
    pub submitted: ShippingInfo,
}

fn check_text(
    errors: &mut BTreeMap<&'static str, &'static str>,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.is_empty() {
        errors.insert(field, "This field is required.");
    } else if value.chars().count() > max {
        errors.insert(field, "Ensure this value is not too long.");
    }
}

impl ShippingInfo {
    pub fn validate(self) -> Result<ValidShipping, ShippingErrors> {
        let mut errors = BTreeMap::new();
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        let address = self.address.trim();
        let postal_code = self.postal_code.trim();
        let city = self.city.trim();

        check_text(&mut errors, "first_name", first_name, FIRST_NAME_MAX);
        check_text(&mut errors, "last_name", last_name, LAST_NAME_MAX);
        check_text(&mut errors, "address", address, ADDRESS_MAX);
        check_text(&mut errors, "postal_code", postal_code, POSTAL_CODE_MAX);
        check_text(&mut errors, "city", city, CITY_MAX);
        check_text(&mut errors, "email", email, EMAIL_MAX);
        if !errors.contains_key("email") && !is_valid_email(email) {
            errors.insert("email", "Enter a valid email address.");
        }

        if !errors.is_empty() {
            return Err(ShippingErrors {
                errors,
                submitted: self,
            });
        }
        Ok(ValidShipping {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            address: address.to_owned(),
            postal_code: postal_code.to_owned(),
            city: city.to_owned(),
        })
    }
}

/// Syntactic email check: `local@domain.tld`, no whitespace, no empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::cost).sum()
    }
}

/// Order line; price and name are copied from the product at purchase time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    pub fn cost(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            updated_at: Utc::now(),
        }
    }
}
