use thiserror::Error;

/// Every remote call the clients can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListCategories,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    ListTags,
    CreateTag,
    UpdateTag,
    DeleteTag,
    ListProducts,
    GetProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
}

impl ApiOperation {
    /// Human-readable message shown when this operation fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ApiOperation::ListCategories => "Failed to load categories",
            ApiOperation::CreateCategory => "Failed to create category",
            ApiOperation::UpdateCategory => "Failed to update category",
            ApiOperation::DeleteCategory => "Failed to delete category",
            ApiOperation::ListTags => "Failed to load tags",
            ApiOperation::CreateTag => "Failed to create tag",
            ApiOperation::UpdateTag => "Failed to update tag",
            ApiOperation::DeleteTag => "Failed to delete tag",
            ApiOperation::ListProducts => "Failed to load products",
            ApiOperation::GetProduct => "Failed to load product",
            ApiOperation::CreateProduct => "Failed to create product",
            ApiOperation::UpdateProduct => "Failed to update product",
            ApiOperation::DeleteProduct => "Failed to delete product",
        }
    }

    /// True for the category/tag administration endpoints.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            ApiOperation::ListCategories
                | ApiOperation::CreateCategory
                | ApiOperation::UpdateCategory
                | ApiOperation::DeleteCategory
                | ApiOperation::ListTags
                | ApiOperation::CreateTag
                | ApiOperation::UpdateTag
                | ApiOperation::DeleteTag
        )
    }

    /// Machine-readable code used in trace entries.
    pub fn code(&self) -> &'static str {
        match self {
            ApiOperation::ListCategories => "CATEGORY_LIST_FAILED",
            ApiOperation::CreateCategory => "CATEGORY_CREATE_FAILED",
            ApiOperation::UpdateCategory => "CATEGORY_UPDATE_FAILED",
            ApiOperation::DeleteCategory => "CATEGORY_DELETE_FAILED",
            ApiOperation::ListTags => "TAG_LIST_FAILED",
            ApiOperation::CreateTag => "TAG_CREATE_FAILED",
            ApiOperation::UpdateTag => "TAG_UPDATE_FAILED",
            ApiOperation::DeleteTag => "TAG_DELETE_FAILED",
            ApiOperation::ListProducts => "PRODUCT_LIST_FAILED",
            ApiOperation::GetProduct => "PRODUCT_GET_FAILED",
            ApiOperation::CreateProduct => "PRODUCT_CREATE_FAILED",
            ApiOperation::UpdateProduct => "PRODUCT_UPDATE_FAILED",
            ApiOperation::DeleteProduct => "PRODUCT_DELETE_FAILED",
        }
    }
}

/// Why a remote call failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    #[error("network error: {0}")]
    Network(String),
    #[error("request rejected with status {status}")]
    Client { status: u16 },
    #[error("server error with status {status}")]
    Server { status: u16 },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl FailureKind {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        if (400..500).contains(&status) {
            FailureKind::Client { status }
        } else {
            FailureKind::Server { status }
        }
    }

    /// Returns true if repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Network(_) | FailureKind::Server { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FailureKind::Client { status } | FailureKind::Server { status } => Some(*status),
            _ => None,
        }
    }
}

/// A failed remote call, tagged with the operation that issued it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {kind}", operation.failure_message())]
pub struct ServiceError {
    pub operation: ApiOperation,
    pub kind: FailureKind,
}

impl ServiceError {
    pub fn new(operation: ApiOperation, kind: FailureKind) -> Self {
        Self { operation, kind }
    }

    pub fn network(operation: ApiOperation, msg: impl Into<String>) -> Self {
        Self::new(operation, FailureKind::Network(msg.into()))
    }

    pub fn status(operation: ApiOperation, status: u16) -> Self {
        Self::new(operation, FailureKind::from_status(status))
    }

    pub fn decode(operation: ApiOperation, msg: impl Into<String>) -> Self {
        Self::new(operation, FailureKind::Decode(msg.into()))
    }
}
