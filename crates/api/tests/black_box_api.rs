use std::sync::Arc;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

use catalog_api::app::services::AppServices;
use catalog_core::ItemTypeId;
use catalog_infra::InMemoryCatalogStore;
use catalog_items::{ItemType, NewItem};

const CATALOG: &str = "/api/v1/catalog";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Apple (type 1), Banana (type 2), Cherry (type 1), ids 1..=3.
    async fn spawn() -> Self {
        let store = InMemoryCatalogStore::with_types([
            ItemType::new(ItemTypeId::from_raw(1), "Fruit"),
            ItemType::new(ItemTypeId::from_raw(2), "Berry"),
        ])
        .expect("valid types");
        let services = AppServices::new(Arc::new(store), false);
        for (i, name) in ["Apple", "Banana", "Cherry"].into_iter().enumerate() {
            let type_id = ItemTypeId::from_raw(i as i64 % 2 + 1);
            services
                .catalog
                .create_item(NewItem::new(name, Decimal::new(i as i64 + 1, 0), type_id))
                .await
                .expect("seed insert");
        }

        // Same router as prod, but bound to an ephemeral port.
        let app = catalog_api::app::build_router(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, CATALOG, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_json(client: &reqwest::Client, url: &str) -> (StatusCode, serde_json::Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_ok_and_tagged_with_request_id() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn caller_request_id_is_echoed() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/catalogtypes"))
        .header("x-request-id", "trace-abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "trace-abc");
}

#[tokio::test]
async fn cors_preflight_mirrors_the_caller() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, srv.url("/items"))
        .header("origin", "http://shop.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://shop.example");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(headers["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn cors_headers_on_plain_requests() {
    let srv = TestServer::spawn().await;
    let res = reqwest::Client::new()
        .get(srv.url("/catalogtypes"))
        .header("origin", "http://shop.example")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "http://shop.example");
}

#[tokio::test]
async fn paged_listing_returns_envelope() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &srv.url("/items?pageSize=2&pageIndex=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageIndex"], 1);
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["count"], 3);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Cherry");
    assert_eq!(data[0]["id"], 3);
}

#[tokio::test]
async fn paging_defaults_to_first_ten() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&reqwest::Client::new(), &srv.url("/items")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageIndex"], 0);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn bad_paging_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for query in ["pageSize=0", "pageIndex=-1", "pageSize=abc"] {
        let (status, body) = get_json(&client, &srv.url(&format!("/items?{query}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(body["error"], "invalid_argument", "{query}");
    }
}

#[tokio::test]
async fn listing_by_ids_returns_a_plain_array() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&reqwest::Client::new(), &srv.url("/items?ids=3,1,42")).await;

    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, [1, 3]);
}

#[tokio::test]
async fn listing_by_ids_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &srv.url("/items?ids=1,abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");

    let (status, body) = get_json(&client, &srv.url("/items?ids=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_argument");

    let (status, body) = get_json(&client, &srv.url("/items?ids=99")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty_result");
}

#[tokio::test]
async fn get_by_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &srv.url("/items/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Banana");
    assert_eq!(body["typeId"], 2);

    let (status, _) = get_json(&client, &srv.url("/items/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&client, &srv.url("/items/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&client, &srv.url("/items/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn name_prefix_listing() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&reqwest::Client::new(), &srv.url("/items/withname/Ba")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Banana");
}

#[tokio::test]
async fn type_listings() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, &srv.url("/items/type/all/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["typeId"] == 1));

    let (status, body) = get_json(&client, &srv.url("/items/type/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (status, _) = get_json(&client, &srv.url("/items/type/all/x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_types_are_listed() {
    let srv = TestServer::spawn().await;
    let (status, body) = get_json(&reqwest::Client::new(), &srv.url("/catalogtypes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": 1, "name": "Fruit" }, { "id": 2, "name": "Berry" }]));
}

#[tokio::test]
async fn create_then_fetch_via_location() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "Damson", "price": 2.5, "catalogTypeId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["id"], 4);
    assert_eq!(location, "/api/v1/catalog/items/4");

    let (status, item) = get_json(&client, &format!("{}{}", srv.base_url, location)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Damson");
    assert_eq!(item["price"], 2.5);
}

#[tokio::test]
async fn prices_keep_every_digit() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .header("content-type", "application/json")
        .body(r#"{"name":"Gold Mug","price":1234567890123456.78,"typeId":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();

    let res = client
        .get(srv.url(&format!("/items/{}", created["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert!(text.contains(r#""price":1234567890123456.78"#), "{text}");

    let res = client
        .post(srv.url("/items"))
        .header("content-type", "application/json")
        .body(r#"{"name":"Mill Mug","price":0.125,"typeId":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_bad_items() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "Ghost", "price": 1, "typeId": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "constraint_violation");

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "Cheap", "price": -1, "typeId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_argument");

    let res = client
        .post(srv.url("/items"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_replaces_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/items"))
        .json(&json!({ "id": 2, "name": "Blueberry", "price": 4, "typeId": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["location"], "/api/v1/catalog/items/2");

    let (_, item) = get_json(&client, &srv.url("/items/2")).await;
    assert_eq!(item["name"], "Blueberry");

    let res = client
        .put(srv.url("/items"))
        .json(&json!({ "id": 99, "name": "Nobody", "price": 1, "typeId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_delete_again() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.delete(srv.url("/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.delete(srv.url("/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let (_, body) = get_json(&client, &srv.url("/items")).await;
    assert_eq!(body["count"], 2);
}
