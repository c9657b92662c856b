//! Shared fixtures: an in-memory admin service and a recording HTTP backend.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;

use catalog_admin_lib::admin::{AdminService, Category, CategoryId, Tag, TagId};
use catalog_admin_lib::core::settings::ClientConfig;
use catalog_admin_lib::shared::errors::{ApiOperation, ServiceError};
use catalog_admin_lib::shared::http::ApiClient;

// =============================================================================
// In-memory admin service
// =============================================================================

#[derive(Default)]
struct FakeState {
    categories: Vec<Category>,
    tags: Vec<Tag>,
    next_id: i64,
    failing: HashSet<ApiOperation>,
    failing_tag_lists: HashSet<CategoryId>,
    calls: Vec<String>,
}

/// Behaves like the catalog backend, with per-operation failure injection.
#[derive(Default)]
pub struct FakeAdminService {
    state: Mutex<FakeState>,
}

impl FakeAdminService {
    pub fn new() -> Self {
        let service = Self::default();
        service.state.lock().unwrap().next_id = 100;
        service
    }

    pub fn with_category(self, id: i64, name: &str) -> Self {
        self.state.lock().unwrap().categories.push(Category {
            id: CategoryId::from(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_tag(self, id: i64, name: &str, category_id: i64) -> Self {
        self.state.lock().unwrap().tags.push(Tag {
            id: TagId::from(id),
            name: name.to_string(),
            category_id: CategoryId::from(category_id),
        });
        self
    }

    /// Make every call of `operation` fail with a 500.
    pub fn fail(&self, operation: ApiOperation) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn recover(&self, operation: ApiOperation) {
        self.state.lock().unwrap().failing.remove(&operation);
    }

    pub fn fail_tags_for(&self, category_id: i64) {
        self.state
            .lock()
            .unwrap()
            .failing_tag_lists
            .insert(CategoryId::from(category_id));
    }

    /// Calls in the order they were made, e.g. `create_tag(Wool,2)`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn begin(&self, operation: ApiOperation, call: String) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(ServiceError::status(operation, 500));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminService for FakeAdminService {
    async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        self.begin(ApiOperation::ListCategories, "list_categories".into())?;
        Ok(self.state.lock().unwrap().categories.clone())
    }

    async fn create_category(&self, name: &str) -> Result<Category, ServiceError> {
        self.begin(ApiOperation::CreateCategory, format!("create_category({})", name))?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let category = Category {
            id: CategoryId::from(state.next_id),
            name: name.to_string(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: &CategoryId, name: &str) -> Result<Category, ServiceError> {
        self.begin(
            ApiOperation::UpdateCategory,
            format!("update_category({},{})", id, name),
        )?;
        let mut state = self.state.lock().unwrap();
        match state.categories.iter_mut().find(|c| &c.id == id) {
            Some(category) => {
                category.name = name.to_string();
                Ok(category.clone())
            }
            None => Err(ServiceError::status(ApiOperation::UpdateCategory, 404)),
        }
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<(), ServiceError> {
        self.begin(ApiOperation::DeleteCategory, format!("delete_category({})", id))?;
        let mut state = self.state.lock().unwrap();
        state.categories.retain(|c| &c.id != id);
        state.tags.retain(|t| &t.category_id != id);
        Ok(())
    }

    async fn list_tags(&self, category_id: &CategoryId) -> Result<Vec<Tag>, ServiceError> {
        self.begin(ApiOperation::ListTags, format!("list_tags({})", category_id))?;
        let state = self.state.lock().unwrap();
        if state.failing_tag_lists.contains(category_id) {
            return Err(ServiceError::network(ApiOperation::ListTags, "connection reset"));
        }
        Ok(state
            .tags
            .iter()
            .filter(|t| &t.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn create_tag(&self, name: &str, category_id: &CategoryId) -> Result<Tag, ServiceError> {
        self.begin(
            ApiOperation::CreateTag,
            format!("create_tag({},{})", name, category_id),
        )?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let tag = Tag {
            id: TagId::from(state.next_id),
            name: name.to_string(),
            category_id: category_id.clone(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }

    async fn update_tag(
        &self,
        id: &TagId,
        name: &str,
        category_id: &CategoryId,
    ) -> Result<Tag, ServiceError> {
        self.begin(
            ApiOperation::UpdateTag,
            format!("update_tag({},{},{})", id, name, category_id),
        )?;
        let mut state = self.state.lock().unwrap();
        match state.tags.iter_mut().find(|t| &t.id == id) {
            Some(tag) => {
                tag.name = name.to_string();
                tag.category_id = category_id.clone();
                Ok(tag.clone())
            }
            None => Err(ServiceError::status(ApiOperation::UpdateTag, 404)),
        }
    }

    async fn delete_tag(&self, id: &TagId) -> Result<(), ServiceError> {
        self.begin(ApiOperation::DeleteTag, format!("delete_tag({})", id))?;
        self.state.lock().unwrap().tags.retain(|t| &t.id != id);
        Ok(())
    }
}

/// Two categories with tags, matching the usual admin screen.
pub fn seeded_service() -> FakeAdminService {
    FakeAdminService::new()
        .with_category(1, "Shoes")
        .with_category(2, "Hats")
        .with_tag(10, "Running", 1)
        .with_tag(11, "Trail", 1)
        .with_tag(20, "Wool", 2)
}

// =============================================================================
// Recording HTTP backend
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<HashMap<(String, String), (u16, String)>>,
}

/// Serves canned responses keyed by method and path, and records every request.
/// Unregistered routes answer 404.
pub struct FakeServer {
    pub base_url: String,
    state: Arc<ServerState>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.respond_raw(method, path, status, &body.to_string());
    }

    pub fn respond_raw(&self, method: &str, path: &str, status: u16, body: &str) {
        self.state.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request reached the server")
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Some(Duration::from_secs(5)),
            fetch_concurrency: 4,
        })
        .unwrap()
    }
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();

    let (status, body) = canned.unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));
    (
        StatusCode::from_u16(status).unwrap(),
        [("content-type", "application/json")],
        body,
    )
}
