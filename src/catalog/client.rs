//! Product catalog endpoints: public reads plus the admin product writes.

use reqwest::Method;

use super::types::{NewProduct, Product, ProductId, ProductPatch};
use crate::shared::errors::{ApiOperation, ServiceError};
use crate::shared::http::{resource_path, ApiClient};

pub const PRODUCT_API: &str = "/api/products";
pub const ADMIN_PRODUCT_API: &str = "/api/admin/products";

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// One page of the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    /// Clamp the limit into the range the server accepts.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0),
        }
    }

    fn query(&self) -> String {
        format!("?limit={}&offset={}", self.limit, self.offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_products(&self, page: Page) -> Result<Vec<Product>, ServiceError> {
        let path = format!("{}{}", PRODUCT_API, page.query());
        crate::log_target!("catalog", debug, "Listing products at {}", path);
        self.api.get(ApiOperation::ListProducts, &path).await
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.api
            .get(ApiOperation::GetProduct, &resource_path(PRODUCT_API, id))
            .await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ServiceError> {
        let created: Product = self
            .api
            .json(
                ApiOperation::CreateProduct,
                Method::POST,
                ADMIN_PRODUCT_API,
                Some(product),
            )
            .await?;
        crate::log_target!("catalog", info, "Created product {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ServiceError> {
        self.api
            .json(
                ApiOperation::UpdateProduct,
                Method::PATCH,
                &resource_path(ADMIN_PRODUCT_API, id),
                Some(patch),
            )
            .await
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ServiceError> {
        self.api
            .delete(
                ApiOperation::DeleteProduct,
                &resource_path(ADMIN_PRODUCT_API, id),
            )
            .await?;
        crate::log_target!("catalog", info, "Deleted product {}", id);
        Ok(())
    }
}
