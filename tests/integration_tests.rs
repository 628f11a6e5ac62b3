use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use product_catalog::{
    build_app, infrastructure::memory::MemoryProductStore, Product, ProductRepository,
    ProductStore, StoreError,
};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;

fn app_with_store(store: Arc<dyn ProductStore>) -> Router {
    build_app(ProductRepository::new(store))
}

fn memory_app() -> (Router, Arc<MemoryProductStore>) {
    let store = Arc::new(MemoryProductStore::new());
    (app_with_store(store.clone()), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_product_lifecycle() {
    let (app, _) = memory_app();

    let created = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "Id": "p1", "Name": "Widget" })),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(
        created.headers().get(header::LOCATION).unwrap(),
        "/api/products/p1"
    );
    assert_eq!(body_json(created).await, json!({ "id": "p1", "Name": "Widget" }));

    let fetched = send(&app, Method::GET, "/api/products/p1", None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await, json!({ "id": "p1", "Name": "Widget" }));

    let updated = send(
        &app,
        Method::PUT,
        "/api/products/p1",
        Some(json!({ "Id": "p1", "Name": "WidgetV2" })),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(updated).await.is_empty());

    let fetched = send(&app, Method::GET, "/api/products/p1", None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await, json!({ "id": "p1", "Name": "WidgetV2" }));

    let deleted = send(&app, Method::DELETE, "/api/products/p1", None).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = send(&app, Method::GET, "/api/products/p1", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(missing).await.is_empty());
}

#[tokio::test]
async fn test_list_returns_every_saved_product() {
    let (app, _) = memory_app();

    let empty = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(empty.status(), StatusCode::OK);
    assert_eq!(body_json(empty).await, json!([]));

    for id in ["a", "b", "c"] {
        let response = send(
            &app,
            Method::POST,
            "/api/products",
            Some(json!({ "id": id, "price": 10 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listed = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(listed.status(), StatusCode::OK);
    let mut products: Vec<Product> = serde_json::from_value(body_json(listed).await).unwrap();
    products.sort_by(|x, y| x.id.cmp(&y.id));
    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_put_with_mismatched_id_is_rejected_without_mutation() {
    let (app, store) = memory_app();
    send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "id": "a", "name": "Original" })),
    )
    .await;

    let response = send(
        &app,
        Method::PUT,
        "/api/products/a",
        Some(json!({ "id": "b", "name": "Changed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_bytes(response).await.is_empty());

    assert_eq!(store.len().unwrap(), 1);
    let stored = store.get("a").await.unwrap().unwrap();
    assert_eq!(stored.attributes["name"], json!("Original"));
    assert!(store.get("b").await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_id_comparison_is_exact() {
    let (app, store) = memory_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/products/P1",
        Some(json!({ "id": "p1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_put_creates_missing_product() {
    let (app, store) = memory_app();

    let response = send(
        &app,
        Method::PUT,
        "/api/products/new",
        Some(json!({ "id": "new", "name": "Fresh" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.get("new").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_unknown_product_returns_not_found() {
    let (app, store) = memory_app();
    send(&app, Method::POST, "/api/products", Some(json!({ "id": "keep" }))).await;

    let response = send(&app, Method::DELETE, "/api/products/unknown", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn test_post_rejects_invalid_bodies() {
    let (app, store) = memory_app();

    let empty_id = send(&app, Method::POST, "/api/products", Some(json!({ "id": "" }))).await;
    assert_eq!(empty_id.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(empty_id).await["code"], 400);

    let missing_id =
        send(&app, Method::POST, "/api/products", Some(json!({ "name": "NoId" }))).await;
    assert_eq!(missing_id.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let malformed = app.clone().oneshot(request).await.unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_location_header_encodes_id() {
    let (app, _) = memory_app();

    let created = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "id": "blue widget" })),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let location = created
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "/api/products/blue%20widget");

    let fetched = send(&app, Method::GET, &location, None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["id"], "blue widget");
}

#[tokio::test]
async fn test_location_header_for_dot_segment_id() {
    let (app, _) = memory_app();

    let created = send(&app, Method::POST, "/api/products", Some(json!({ "id": ".." }))).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let location = created
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(location, "/api/products/%2E%2E");

    let fetched = send(&app, Method::GET, &location, None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await["id"], "..");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (app, _) = memory_app();
    let response = send(&app, Method::GET, "/api/products", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_reports_storage_backend() {
    let (app, _) = memory_app();
    let response = send(&app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

/// 所有操作都失败的存储，同时统计写操作次数
#[derive(Default)]
struct FailingStore {
    writes: AtomicUsize,
}

#[derive(Debug, thiserror::Error)]
#[error("throttled")]
struct Throttled;

#[async_trait]
impl ProductStore for FailingStore {
    async fn scan(&self) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::backend(Throttled))
    }

    async fn get(&self, _id: &str) -> Result<Option<Product>, StoreError> {
        Err(StoreError::backend(Throttled))
    }

    async fn put(&self, _product: &Product) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::backend(Throttled))
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::backend(Throttled))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn test_store_failures_surface_as_server_errors() {
    let store = Arc::new(FailingStore::default());
    let app = app_with_store(store.clone());

    let list = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(list.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(list).await["code"], 500);

    let get = send(&app, Method::GET, "/api/products/p1", None).await;
    assert_eq!(get.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let post = send(&app, Method::POST, "/api/products", Some(json!({ "id": "p1" }))).await;
    assert_eq!(post.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let delete = send(&app, Method::DELETE, "/api/products/p1", None).await;
    assert_eq!(delete.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // 存在性检查失败后不会再尝试删除
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mismatched_put_never_reaches_store() {
    let store = Arc::new(FailingStore::default());
    let app = app_with_store(store.clone());

    let response = send(
        &app,
        Method::PUT,
        "/api/products/a",
        Some(json!({ "id": "b" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}
