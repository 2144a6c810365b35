//! Catalog endpoints: products, categories and brands.

use haat_core::{Brand, BrandId, Category, CategoryId, Product, ProductId, ProductPage};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::cache::CacheValue;
use super::{ApiClient, ApiError, extract_list};

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
    pub page: Option<u32>,
}

impl ProductQuery {
    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}",
            self.category.as_ref().map_or("", CategoryId::as_str),
            self.brand.as_ref().map_or("", BrandId::as_str),
            self.page.unwrap_or(1)
        )
    }
}

/// The listing answers with a page object; older deployments send a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListResponse {
    Bare(Vec<Product>),
    Page(ProductPage),
}

impl From<ProductListResponse> for ProductPage {
    fn from(response: ProductListResponse) -> Self {
        match response {
            ProductListResponse::Page(page) => page,
            ProductListResponse::Bare(products) => Self {
                total: u64::try_from(products.len()).ok(),
                products,
                page: 1,
                pages: 1,
            },
        }
    }
}

impl ApiClient {
    /// List products, optionally filtered.
    ///
    /// Keyword searches bypass the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let keyword = query.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let cache_key = query.cache_key();

        // Check cache (only for listings without search)
        if keyword.is_none()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut url = self.url("api/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(keyword) = keyword {
                pairs.append_pair("keyword", keyword);
            }
            if let Some(category) = &query.category {
                pairs.append_pair("category", category.as_str());
            }
            if let Some(brand) = &query.brand {
                pairs.append_pair("brand", brand.as_str());
            }
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
        }
        // Drop the dangling `?` when no filter was set
        if url.query() == Some("") {
            url.set_query(None);
        }

        let page: ProductPage = self.get_url::<ProductListResponse>(url).await?.into();

        if keyword.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("api/products/{}", urlencoding::encode(id.as_str()));
        let product: Product = self.get(&path, None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let value = self.get("api/categories", None).await?;
        let categories: Vec<Category> = extract_list(value, &["categories", "data"])?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// List all brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        let cache_key = "brands".to_string();

        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let value = self.get("api/brands", None).await?;
        let brands: Vec<Brand> = extract_list(value, &["brands", "data"])?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }
}
