use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_domain::catalog::ProductSortBy;

use crate::domain::types::{Category, ProductListing};
use crate::error::StoreServiceError;
use crate::state::AppState;
use crate::usecase::catalog::{
    GetProductUseCase, ListCategoriesUseCase, ListProductsInput, ListProductsUseCase,
    ProductList,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(serialize_with = "storefront_core::serde::decimal_as_f64")]
    pub price: Decimal,
    pub description: String,
    pub image: Option<String>,
    pub category: CategoryResponse,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductListing> for ProductResponse {
    fn from(listing: ProductListing) -> Self {
        let ProductListing { product, category } = listing;
        Self {
            id: product.id.to_string(),
            name: product.name,
            slug: product.slug,
            price: product.price,
            description: product.description,
            image: product.image,
            category: category.into(),
            created_at: product.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct ProductListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
    pub products: Vec<ProductResponse>,
    pub total: usize,
}

impl From<ProductList> for ProductListResponse {
    fn from(list: ProductList) -> Self {
        let total = list.products.len();
        Self {
            category: list.category.map(CategoryResponse::from),
            products: list.products.into_iter().map(ProductResponse::from).collect(),
            total,
        }
    }
}

#[derive(Serialize)]
pub struct ProductDetailResponse {
    pub product: ProductResponse,
    pub related: Vec<ProductResponse>,
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
}

fn parse_query(raw_query: Option<String>) -> Result<ProductListQuery, StoreServiceError> {
    raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| StoreServiceError::InvalidQuery)
        .map(Option::unwrap_or_default)
}

async fn list_products_in(
    state: &AppState,
    category_slug: Option<String>,
    query: ProductListQuery,
) -> Result<Json<ProductListResponse>, StoreServiceError> {
    let usecase = ListProductsUseCase {
        repo: state.catalog_repo(),
    };
    let list = usecase
        .execute(ListProductsInput {
            category_slug,
            search: query.search,
            sort_by: ProductSortBy::from_query(query.sort_by.as_deref()),
        })
        .await?;
    Ok(Json(list.into()))
}

// ── GET /categories ──────────────────────────────────────────────────────────

pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, StoreServiceError> {
    let usecase = ListCategoriesUseCase {
        repo: state.catalog_repo(),
    };
    let categories = usecase.execute().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

// ── GET /products ────────────────────────────────────────────────────────────

pub async fn get_products(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<ProductListResponse>, StoreServiceError> {
    let mut query = parse_query(raw_query)?;
    let category_slug = query.category.take();
    list_products_in(&state, category_slug, query).await
}

// ── GET /categories/{slug}/products ──────────────────────────────────────────

pub async fn get_category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<ProductListResponse>, StoreServiceError> {
    let query = parse_query(raw_query)?;
    list_products_in(&state, Some(slug), query).await
}

// ── GET /products/{slug} ─────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetailResponse>, StoreServiceError> {
    let usecase = GetProductUseCase {
        repo: state.catalog_repo(),
    };
    let detail = usecase.execute(&slug).await?;
    Ok(Json(ProductDetailResponse {
        product: detail.listing.into(),
        related: detail.related.into_iter().map(Into::into).collect(),
    }))
}
