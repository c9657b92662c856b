//! Remote category/tag service.
//!
//! Every operation either returns the record as the server confirmed it or a
//! [`ServiceError`]. Nothing here touches client-side state.

use async_trait::async_trait;
use reqwest::Method;

use super::types::{Category, CategoryId, CategoryPayload, Tag, TagId, TagPayload, TagRecord};
use crate::shared::errors::{ApiOperation, ServiceError};
use crate::shared::http::{resource_path, ApiClient};

pub const CATEGORY_API: &str = "/api/admin/products/categories";
pub const TAG_API: &str = "/api/admin/products/tags";

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError>;

    async fn create_category(&self, name: &str) -> Result<Category, ServiceError>;

    async fn update_category(&self, id: &CategoryId, name: &str) -> Result<Category, ServiceError>;

    async fn delete_category(&self, id: &CategoryId) -> Result<(), ServiceError>;

    async fn list_tags(&self, category_id: &CategoryId) -> Result<Vec<Tag>, ServiceError>;

    async fn create_tag(&self, name: &str, category_id: &CategoryId) -> Result<Tag, ServiceError>;

    async fn update_tag(
        &self,
        id: &TagId,
        name: &str,
        category_id: &CategoryId,
    ) -> Result<Tag, ServiceError>;

    async fn delete_tag(&self, id: &TagId) -> Result<(), ServiceError>;
}

/// [`AdminService`] over the catalog REST API.
#[derive(Clone)]
pub struct HttpAdminClient {
    api: ApiClient,
}

impl HttpAdminClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AdminService for HttpAdminClient {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.api.get(ApiOperation::ListCategories, CATEGORY_API).await
    }

    async fn create_category(&self, name: &str) -> Result<Category, ServiceError> {
        self.api
            .json(
                ApiOperation::CreateCategory,
                Method::POST,
                CATEGORY_API,
                Some(&CategoryPayload { name }),
            )
            .await
    }

    async fn update_category(&self, id: &CategoryId, name: &str) -> Result<Category, ServiceError> {
        self.api
            .json(
                ApiOperation::UpdateCategory,
                Method::PATCH,
                &resource_path(CATEGORY_API, id),
                Some(&CategoryPayload { name }),
            )
            .await
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), ServiceError> {
        self.api
            .delete(ApiOperation::DeleteCategory, &resource_path(CATEGORY_API, id))
            .await
    }

    async fn list_tags(&self, category_id: &CategoryId) -> Result<Vec<Tag>, ServiceError> {
        let records: Vec<TagRecord> = self
            .api
            .get(
                ApiOperation::ListTags,
                &format!("{}/tags", resource_path(CATEGORY_API, category_id)),
            )
            .await?;

        Ok(records
            .into_iter()
            .map(|record| record.into_tag(category_id))
            .collect())
    }

    async fn create_tag(&self, name: &str, category_id: &CategoryId) -> Result<Tag, ServiceError> {
        let record: TagRecord = self
            .api
            .json(
                ApiOperation::CreateTag,
                Method::POST,
                TAG_API,
                Some(&TagPayload { name, category_id }),
            )
            .await?;

        Ok(record.into_tag(category_id))
    }

    async fn update_tag(
        &self,
        id: &TagId,
        name: &str,
        category_id: &CategoryId,
    ) -> Result<Tag, ServiceError> {
        let record: TagRecord = self
            .api
            .json(
                ApiOperation::UpdateTag,
                Method::PATCH,
                &resource_path(TAG_API, id),
                Some(&TagPayload { name, category_id }),
            )
            .await?;

        Ok(record.into_tag(category_id))
    }

    async fn delete_tag(&self, id: &TagId) -> Result<(), ServiceError> {
        self.api
            .delete(ApiOperation::DeleteTag, &resource_path(TAG_API, id))
            .await
    }
}
