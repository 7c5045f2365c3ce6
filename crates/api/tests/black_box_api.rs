use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use lablink_api::app::{AppServices, build_app};
use lablink_infra::config::AdminCredentials;
use lablink_infra::notify::NotificationQueue;
use lablink_infra::store::{JsonFileSnapshotStore, SnapshotStore};
use lablink_infra::LendingEngine;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AppServices::in_memory()).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn add_item(&self, name: &str, qty: Value) -> String {
        let (status, body) = self
            .post("/api/add", json!({ "name": name, "category": "Boards", "qty": qty }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["item"]["id"].as_str().unwrap().to_string()
    }

    async fn submit(&self, item_id: &str, reg_no: &str) -> String {
        let (status, body) = self
            .post(
                "/api/request",
                json!({
                    "itemId": item_id,
                    "studentName": "Anika",
                    "regNo": reg_no,
                    "returnDate": "2026-11-30",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);
        body["request"]["requestId"].as_str().unwrap().to_string()
    }

    async fn decide(&self, request_id: &str, action: &str) -> (StatusCode, Value) {
        self.post(
            "/api/handle-request",
            json!({ "requestId": request_id, "action": action }),
        )
        .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn qty_of(items: &Value, id: &str) -> u64 {
    items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["id"] == id)
        .map(|item| item["qty"].as_u64().unwrap())
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn add_list_and_delete_items() {
    let srv = TestServer::spawn().await;

    let id = srv.add_item("Raspberry Pi 4", json!("3")).await;
    let (status, items) = srv.get("/api/components").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["name"], "Raspberry Pi 4");
    assert_eq!(items[0]["category"], "Boards");
    assert_eq!(qty_of(&items, &id), 3);

    let res = srv
        .client
        .delete(srv.url(&format!("/api/delete-item/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .delete(srv.url(&format!("/api/delete-item/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");

    let (_, items) = srv.get("/api/components").await;
    assert!(items.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bad_quantities_are_invalid_input() {
    let srv = TestServer::spawn().await;

    for qty in [json!("ten"), json!(-2), json!(1.5), Value::Null] {
        let (status, body) = srv
            .post("/api/add", json!({ "name": "Kit", "category": "", "qty": qty }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "qty {qty}: {body}");
        assert_eq!(body["error"], "invalid_input");
    }

    let (_, items) = srv.get("/api/components").await;
    assert!(items.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lending_lifecycle_with_single_unit() {
    let srv = TestServer::spawn().await;
    let item_id = srv.add_item("Arduino Uno", json!(1)).await;

    let first = srv.submit(&item_id, "21BCE0001").await;
    let (_, pending) = srv.get("/api/requests").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["status"], "Pending");
    assert_eq!(pending[0]["itemName"], "Arduino Uno");

    let (status, body) = srv.decide(&first, "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request approved");

    let (_, items) = srv.get("/api/components").await;
    assert_eq!(qty_of(&items, &item_id), 0);
    let (_, loans) = srv.get("/api/loans").await;
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["requestId"], first.as_str());
    assert!(loans[0]["approvedDate"].is_string());
    let loan_id = loans[0]["loanId"].as_str().unwrap();
    assert!(!loan_id.is_empty());
    assert_ne!(loan_id, first.as_str());

    let second = srv.submit(&item_id, "21BCE0002").await;
    let (status, body) = srv.decide(&second, "approve").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "out_of_stock");

    let (_, pending) = srv.get("/api/requests").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["requestId"], second.as_str());

    // Already decided.
    let (status, _) = srv.decide(&first, "reject").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = srv.decide(&second, "REJECT").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request rejected");
    let (_, rejected) = srv.get("/api/rejected").await;
    assert_eq!(rejected[0]["requestId"], second.as_str());
    assert!(rejected[0]["rejectedDate"].is_string());
}

#[tokio::test]
async fn submit_and_decide_validate_their_input() {
    let srv = TestServer::spawn().await;
    let item_id = srv.add_item("Breadboard", json!(2)).await;

    let cases = [
        json!({ "itemId": "", "studentName": "A", "regNo": "R1", "returnDate": "2026-11-30" }),
        json!({ "itemId": item_id, "studentName": " ", "regNo": "R1", "returnDate": "2026-11-30" }),
        json!({ "itemId": item_id, "studentName": "A", "regNo": "R1", "returnDate": "next week" }),
    ];
    for body in cases {
        let (status, res) = srv.post("/api/request", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{res}");
    }

    let unknown_item = lablink_inventory::ItemId::generate().to_string();
    let (status, _) = srv
        .post(
            "/api/request",
            json!({ "itemId": unknown_item, "studentName": "A", "regNo": "R1", "returnDate": "2026-11-30" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request_id = srv.submit(&item_id, "R1").await;
    let (status, body) = srv.decide(&request_id, "archive").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let res = srv
        .client
        .post(srv.url("/api/handle-request"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ids_that_match_nothing_are_not_found() {
    let srv = TestServer::spawn().await;
    let item_id = srv.add_item("Soldering Iron", json!(1)).await;
    srv.submit(&item_id, "R1").await;

    for raw in ["not-an-id", "12345"] {
        let (status, body) = srv
            .post(
                "/api/request",
                json!({ "itemId": raw, "studentName": "A", "regNo": "R1", "returnDate": "2026-11-30" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "itemId {raw}: {body}");
        assert_eq!(body["error"], "not_found");
    }

    let (status, body) = srv.decide("1700000000000", "approve").await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    assert_eq!(body["error"], "not_found");

    let res = srv
        .client
        .delete(srv.url("/api/delete-item/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    // Blank ids are still a validation failure.
    let (status, body) = srv.decide(" ", "approve").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (_, items) = srv.get("/api/components").await;
    assert_eq!(qty_of(&items, &item_id), 1);
    let (_, pending) = srv.get("/api/requests").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn student_history_partitions_records() {
    let srv = TestServer::spawn().await;
    let item_id = srv.add_item("ESP32", json!(5)).await;

    let a = srv.submit(&item_id, "20BIT0001").await;
    let b = srv.submit(&item_id, "20BIT0001").await;
    srv.submit(&item_id, "20BIT0001").await;
    srv.submit(&item_id, "20BIT0002").await;
    srv.decide(&a, "approve").await;
    srv.decide(&b, "reject").await;

    let (status, history) = srv.get("/api/student-history?regNo=20BIT0001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["pending"].as_array().unwrap().len(), 1);
    assert_eq!(history["approved"].as_array().unwrap().len(), 1);
    assert_eq!(history["rejected"].as_array().unwrap().len(), 1);
    assert_eq!(history["approved"][0]["requestId"], a.as_str());

    let (status, body) = srv.get("/api/student-history?regNo=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn login_checks_admin_credentials() {
    let engine = Arc::new(LendingEngine::in_memory());
    let admin = AdminCredentials {
        email: "lab@uni.edu".to_string(),
        password: "pw".to_string(),
    };
    let srv = TestServer::spawn_with(AppServices::new(engine, admin)).await;

    let (status, body) = srv
        .post("/api/login", json!({ "email": "lab@uni.edu", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!body["token"].as_str().unwrap().is_empty());

    let (status, body) = srv
        .post("/api/login", json!({ "email": "lab@uni.edu", "password": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn state_survives_a_restart_with_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("database.json");

    let open = || {
        let store: Arc<dyn SnapshotStore> = Arc::new(JsonFileSnapshotStore::new(&path));
        let engine = LendingEngine::open(store, NotificationQueue::disabled()).unwrap();
        AppServices::new(Arc::new(engine), lablink_infra::Config::default().admin)
    };

    let item_id;
    {
        let srv = TestServer::spawn_with(open()).await;
        item_id = srv.add_item("Logic Analyzer", json!(2)).await;
        let request_id = srv.submit(&item_id, "22BEC0010").await;
        srv.decide(&request_id, "approve").await;
        srv.submit(&item_id, "22BEC0011").await;
    }

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["activeLoans"].as_array().unwrap().len(), 1);
    assert_eq!(raw["requests"].as_array().unwrap().len(), 1);

    let srv = TestServer::spawn_with(open()).await;
    let (_, items) = srv.get("/api/components").await;
    assert_eq!(qty_of(&items, &item_id), 1);
    let (_, history) = srv.get("/api/student-history?regNo=22BEC0010").await;
    assert_eq!(history["approved"].as_array().unwrap().len(), 1);
}
