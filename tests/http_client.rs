//! Integration tests for the HTTP clients against a recording backend.
//!
//! Covers request paths, methods and bodies, status classification, and the
//! category backfill for tag responses that omit their owner.

mod common;

use serde_json::json;

use catalog_admin_lib::admin::{AdminService, Category, CategoryId, HttpAdminClient, Tag, TagId};
use catalog_admin_lib::catalog::{CatalogClient, NewProduct, Page, Price, ProductId, ProductPatch};
use catalog_admin_lib::core::settings::ClientConfig;
use catalog_admin_lib::shared::errors::{ApiOperation, FailureKind};
use catalog_admin_lib::shared::http::ApiClient;

use common::FakeServer;

const CATEGORIES: &str = "/api/admin/products/categories";
const TAGS: &str = "/api/admin/products/tags";

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_list_categories() {
    let server = FakeServer::start().await;
    server.respond(
        "GET",
        CATEGORIES,
        200,
        json!([{"id": 1, "name": "Shoes"}, {"id": 2, "name": "Hats"}]),
    );
    let client = HttpAdminClient::new(server.client());

    let categories = client.list_categories().await.unwrap();

    assert_eq!(
        categories,
        vec![
            Category { id: CategoryId::from(1), name: "Shoes".into() },
            Category { id: CategoryId::from(2), name: "Hats".into() },
        ]
    );
    assert_eq!(server.last_request().method, "GET");
}

#[tokio::test]
async fn test_create_category_posts_name() {
    let server = FakeServer::start().await;
    server.respond("POST", CATEGORIES, 201, json!({"id": 7, "name": "Bags"}));
    let client = HttpAdminClient::new(server.client());

    let created = client.create_category("Bags").await.unwrap();

    assert_eq!(created.id, CategoryId::from(7));
    let request = server.last_request();
    assert_eq!(request.path, CATEGORIES);
    assert_eq!(request.body, Some(json!({"name": "Bags"})));
}

#[tokio::test]
async fn test_update_category_patches_by_id() {
    let server = FakeServer::start().await;
    let path = format!("{}/3", CATEGORIES);
    server.respond("PATCH", &path, 200, json!({"id": 3, "name": "Boots"}));
    let client = HttpAdminClient::new(server.client());

    let updated = client
        .update_category(&CategoryId::from(3), "Boots")
        .await
        .unwrap();

    assert_eq!(updated.name, "Boots");
    let request = server.last_request();
    assert_eq!(request.method, "PATCH");
    assert_eq!(request.path, path);
    assert_eq!(request.body, Some(json!({"name": "Boots"})));
}

#[tokio::test]
async fn test_delete_ignores_body() {
    let server = FakeServer::start().await;
    server.respond("DELETE", &format!("{}/3", CATEGORIES), 200, json!({"ok": true}));
    server.respond_raw("DELETE", &format!("{}/9", TAGS), 204, "");
    let client = HttpAdminClient::new(server.client());

    client.delete_category(&CategoryId::from(3)).await.unwrap();
    client.delete_tag(&TagId::from(9)).await.unwrap();

    assert_eq!(server.requests().len(), 2);
    assert!(server.requests().iter().all(|r| r.method == "DELETE"));
}

#[tokio::test]
async fn test_text_ids_stay_one_path_segment() {
    let server = FakeServer::start().await;
    server.respond("DELETE", &format!("{}/a%2Fb%3F1", TAGS), 200, json!({"ok": true}));
    let client = HttpAdminClient::new(server.client());

    client.delete_tag(&TagId::from("a/b?1")).await.unwrap();

    let request = server.last_request();
    assert_eq!(request.path, format!("{}/a%2Fb%3F1", TAGS));
    assert_eq!(request.query, None);
}

// =============================================================================
// Tags
// =============================================================================

#[tokio::test]
async fn test_list_tags_backfills_category() {
    let server = FakeServer::start().await;
    server.respond(
        "GET",
        &format!("{}/4/tags", CATEGORIES),
        200,
        json!([
            {"id": 1, "name": "Leather"},
            {"id": 2, "name": "Canvas", "categoryId": 4}
        ]),
    );
    let client = HttpAdminClient::new(server.client());

    let tags = client.list_tags(&CategoryId::from(4)).await.unwrap();

    assert_eq!(tags.len(), 2);
    assert!(tags.iter().all(|t| t.category_id == CategoryId::from(4)));
}

#[tokio::test]
async fn test_create_tag_sends_snake_case_owner() {
    let server = FakeServer::start().await;
    server.respond("POST", TAGS, 201, json!({"id": 30, "name": "Wool"}));
    let client = HttpAdminClient::new(server.client());

    let tag = client.create_tag("Wool", &CategoryId::from(2)).await.unwrap();

    assert_eq!(
        tag,
        Tag {
            id: TagId::from(30),
            name: "Wool".into(),
            category_id: CategoryId::from(2)
        }
    );
    assert_eq!(
        server.last_request().body,
        Some(json!({"name": "Wool", "category_id": 2}))
    );
}

#[tokio::test]
async fn test_update_tag_keeps_server_owner() {
    let server = FakeServer::start().await;
    server.respond(
        "PATCH",
        &format!("{}/30", TAGS),
        200,
        json!({"id": 30, "name": "Merino", "categoryId": 5}),
    );
    let client = HttpAdminClient::new(server.client());

    let tag = client
        .update_tag(&TagId::from(30), "Merino", &CategoryId::from(5))
        .await
        .unwrap();

    assert_eq!(tag.category_id, CategoryId::from(5));
    assert_eq!(
        server.last_request().body,
        Some(json!({"name": "Merino", "category_id": 5}))
    );
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_status_failures_are_classified() {
    let server = FakeServer::start().await;
    server.respond("POST", TAGS, 422, json!({"detail": "name required"}));
    server.respond("GET", CATEGORIES, 503, json!({"detail": "down"}));
    let client = HttpAdminClient::new(server.client());

    let err = client.create_tag("", &CategoryId::from(1)).await.unwrap_err();
    assert_eq!(err.operation, ApiOperation::CreateTag);
    assert_eq!(err.kind, FailureKind::Client { status: 422 });
    assert_eq!(err.to_string(), "Failed to create tag: request rejected with status 422");

    let err = client.list_categories().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Server { status: 503 });
    assert!(err.kind.is_retryable());
}

#[tokio::test]
async fn test_unknown_route_is_client_error() {
    let server = FakeServer::start().await;
    let client = HttpAdminClient::new(server.client());

    let err = client.delete_category(&CategoryId::from(99)).await.unwrap_err();

    assert_eq!(err.kind.status(), Some(404));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let server = FakeServer::start().await;
    server.respond_raw("GET", CATEGORIES, 200, "<html>proxy error</html>");
    let client = HttpAdminClient::new(server.client());

    let err = client.list_categories().await.unwrap_err();

    assert!(matches!(err.kind, FailureKind::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(&ClientConfig {
        base_url: format!("http://{}", addr),
        timeout: None,
        fetch_concurrency: 1,
    })
    .unwrap();
    let err = HttpAdminClient::new(api).list_categories().await.unwrap_err();

    assert!(matches!(err.kind, FailureKind::Network(_)));
    assert_eq!(err.operation, ApiOperation::ListCategories);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_list_products_sends_page() {
    let server = FakeServer::start().await;
    server.respond(
        "GET",
        "/api/products",
        200,
        json!([{"id": 1, "name": "Cap", "price": "9.99"}]),
    );
    let client = CatalogClient::new(server.client());

    let products = client
        .list_products(Page::new(Some(500), Some(40)))
        .await
        .unwrap();

    assert_eq!(products[0].price, Price::new("9.99"));
    assert_eq!(
        server.last_request().query.as_deref(),
        Some("limit=200&offset=40")
    );
}

#[tokio::test]
async fn test_get_product_missing() {
    let server = FakeServer::start().await;
    let client = CatalogClient::new(server.client());

    let err = client.get_product(&ProductId::from(5)).await.unwrap_err();

    assert_eq!(err.operation, ApiOperation::GetProduct);
    assert_eq!(err.to_string(), "Failed to load product: request rejected with status 404");
    assert_eq!(server.last_request().path, "/api/products/5");
}

#[tokio::test]
async fn test_admin_product_writes() {
    let server = FakeServer::start().await;
    let product = json!({"id": 8, "name": "Scarf", "price": 15, "stock": 3});
    server.respond("POST", "/api/admin/products", 201, product.clone());
    server.respond("PATCH", "/api/admin/products/8", 200, product);
    server.respond("DELETE", "/api/admin/products/8", 200, json!({"ok": true}));
    let client = CatalogClient::new(server.client());

    let mut new_product = NewProduct::new("Scarf", Price::new("15.00"));
    new_product.stock = 3;
    let created = client.create_product(&new_product).await.unwrap();
    assert_eq!(created.price.as_str(), "15");

    let patch = ProductPatch {
        stock: Some(2),
        ..ProductPatch::default()
    };
    client.update_product(&created.id, &patch).await.unwrap();
    assert_eq!(server.last_request().body, Some(json!({"stock": 2})));

    client.delete_product(&created.id).await.unwrap();
    let methods: Vec<String> = server.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["POST", "PATCH", "DELETE"]);
}
