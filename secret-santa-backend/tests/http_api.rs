use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use secret_santa_backend::notify::{Email, Mailer, Messenger, NotifyError};
use secret_santa_backend::{router, AppState};
use secret_santa_config::{GiftConfig, LotteryConfig};
use secret_santa_database::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMessenger {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, phone: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(phone.to_owned());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    mailer: Arc<RecordingMailer>,
    messenger: Arc<RecordingMessenger>,
}

impl TestApp {
    fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            mailer.clone(),
            messenger.clone(),
            GiftConfig::default(),
            LotteryConfig::default(),
        );
        let public_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/public");
        Self {
            router: router(state, public_dir),
            mailer,
            messenger,
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, bytes) = self
            .request(Method::POST, uri, Body::from(body.to_string()))
            .await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn join(&self, name: &str, phone: Option<&str>, gift: &str) {
        let (status, body) = self
            .post(
                "/api/join",
                &json!({
                    "name": name,
                    "email": format!("{}@family.test", name.to_lowercase()),
                    "phone": phone,
                    "giftName": gift,
                    "price": 25000,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }
}

#[tokio::test]
async fn register_then_duplicate() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/register",
            &json!({"name": "Ana", "email": "ana@family.test", "phone": "+56911111111"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["email"], "ana@family.test");
    assert_eq!(body["phone"], "+56911111111");

    let (status, body) = app
        .post("/register", &json!({"name": "Ana", "email": "ana@family.test"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email already registered");
}

#[tokio::test]
async fn register_requires_name() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/register", &json!({"email": "ana@family.test"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name required");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new();
    let (status, bytes) = app
        .request(Method::POST, "/api/register", Body::from("{not json"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("malformed request body"));
}

#[tokio::test]
async fn gift_validation_messages() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/gift",
            &json!({"email": "nobody@family.test", "giftName": "Socks", "price": 1000}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price too low, the minimum is $20000");

    let (status, body) = app
        .post(
            "/gift",
            &json!({"email": "nobody@family.test", "giftName": "TV", "price": "90000"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "price too high, the maximum is $50000");

    let (status, body) = app
        .post(
            "/api/gift",
            &json!({"email": "nobody@family.test", "giftName": "Socks", "price": 25000}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email not found");
}

#[tokio::test]
async fn gift_is_saved_for_registered_email() {
    let app = TestApp::new();
    app.post(
        "/api/register",
        &json!({"name": "Ana", "email": "ana@family.test"}),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/gift",
            &json!({
                "email": "ana@family.test",
                "giftName": "Socks",
                "giftUrl": "http://socks.test",
                "price": "25000"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["description"], "Socks");
    assert_eq!(body["link"], "http://socks.test");
    assert_eq!(body["price"], 25000.0);
}

#[tokio::test]
async fn join_returns_participant_and_gift() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/join",
            &json!({
                "name": "Ana",
                "email": "ana@family.test",
                "giftName": "Cookbook",
                "giftUrl": "http://cookbook.test",
                "price": 25000
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["participant"]["email"], "ana@family.test");
    assert_eq!(body["gift"]["description"], "Cookbook");
    assert_eq!(body["gift"]["participant_id"], body["participant"]["id"]);
}

#[tokio::test]
async fn lottery_needs_two_participants() {
    let app = TestApp::new();
    app.join("Ana", None, "Book").await;

    let (status, body) = app.post("/api/lottery", &Value::Null).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "at least 2 participants with a gift are required, found 1"
    );
    assert!(app.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn lottery_draws_and_notifies_everyone() {
    let app = TestApp::new();
    app.join("Ana", Some("+56911111111"), "Book").await;
    app.join("Beto", None, "Scarf").await;
    app.join("Carla", None, "Mug").await;

    let (status, body) = app.post("/lottery", &Value::Null).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Lottery drawn. Notified 3 of 3 participants."
    );
    let details = body["details"].as_array().unwrap();
    assert_eq!(details.len(), 3);
    for detail in details {
        assert_ne!(detail["ownGift"], detail["assignedGift"]);
    }
    assert_eq!(body["notifications"][0]["email"]["status"], "delivered");

    assert_eq!(app.mailer.sent.lock().unwrap().len(), 3);
    assert_eq!(
        *app.messenger.sent.lock().unwrap(),
        vec!["+56911111111".to_owned()]
    );
}

#[tokio::test]
async fn static_files_are_served() {
    let app = TestApp::new();

    let (status, bytes) = app.request(Method::GET, "/index.html", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().contains("Secret Santa"));

    let (status, _) = app.request(Method::GET, "/missing.js", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn over_long_name_is_a_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/register",
            &json!({"name": "N".repeat(256), "email": "ana@family.test"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name too long, the maximum is 255 characters");
}
