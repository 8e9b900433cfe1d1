use storefront_domain::catalog::ProductSortBy;

use crate::domain::repository::CatalogRepository;
use crate::domain::types::{Category, ProductFilter, ProductListing};
use crate::error::StoreServiceError;

/// Number of related products shown next to a product.
pub const RELATED_PRODUCTS_LIMIT: u64 = 4;

// ── ListCategories ───────────────────────────────────────────────────────────

pub struct ListCategoriesUseCase<R: CatalogRepository> {
    pub repo: R,
}

impl<R: CatalogRepository> ListCategoriesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Category>, StoreServiceError> {
        self.repo.list_categories().await
    }
}

// ── ListProducts ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ListProductsInput {
    pub category_slug: Option<String>,
    pub search: Option<String>,
    pub sort_by: ProductSortBy,
}

#[derive(Debug)]
pub struct ProductList {
    /// The category the listing was scoped to, if any.
    pub category: Option<Category>,
    pub products: Vec<ProductListing>,
}

pub struct ListProductsUseCase<R: CatalogRepository> {
    pub repo: R,
}

impl<R: CatalogRepository> ListProductsUseCase<R> {
    pub async fn execute(&self, input: ListProductsInput) -> Result<ProductList, StoreServiceError> {
        let category = match input.category_slug.as_deref().filter(|s| !s.is_empty()) {
            Some(slug) => Some(
                self.repo
                    .find_category_by_slug(slug)
                    .await?
                    .ok_or(StoreServiceError::CategoryNotFound)?,
            ),
            None => None,
        };
        let search = input
            .search
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        let filter = ProductFilter {
            category_id: category.as_ref().map(|c| c.id),
            search,
            sort_by: input.sort_by,
        };
        let products = self.repo.list_products(&filter).await?;
        Ok(ProductList { category, products })
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ProductDetail {
    pub listing: ProductListing,
    pub related: Vec<ProductListing>,
}

pub struct GetProductUseCase<R: CatalogRepository> {
    pub repo: R,
}

impl<R: CatalogRepository> GetProductUseCase<R> {
    pub async fn execute(&self, slug: &str) -> Result<ProductDetail, StoreServiceError> {
        let listing = self
            .repo
            .find_available_by_slug(slug)
            .await?
            .ok_or(StoreServiceError::ProductNotFound)?;
        let related = self
            .repo
            .list_related(&listing.product, RELATED_PRODUCTS_LIMIT)
            .await?;
        Ok(ProductDetail { listing, related })
    }
}
