#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use marketplace_backend::{
    database::InMemoryStore,
    error::{Error, Result},
    middleware::auth::issue_token,
    models::profile::UserRole,
    routes::api_router,
    services::email_service::{EmailMessage, EmailSender},
    storage::{InMemoryObjectStorage, UrlSigner},
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";
pub const BASE_URL: &str = "http://localhost:8080";

/// Email sender that keeps every message and can be told to fail.
#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingEmailSender {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(Error::Email("Failed to send email: provider unavailable".into()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub struct TestApp {
    pub router: Router,
    pub email: Arc<RecordingEmailSender>,
    pub storage: Arc<InMemoryObjectStorage>,
}

pub fn setup_app() -> TestApp {
    setup_app_with(RecordingEmailSender::default())
}

pub fn setup_app_with(email: RecordingEmailSender) -> TestApp {
    let email = Arc::new(email);
    let storage = Arc::new(InMemoryObjectStorage::new());
    let state = AppState::build(
        Arc::new(InMemoryStore::new()),
        storage.clone(),
        email.clone(),
        UrlSigner::new("storage-test-secret", BASE_URL),
        JWT_SECRET,
    );
    TestApp {
        router: api_router(state),
        email,
        storage,
    }
}

pub struct User {
    pub id: Uuid,
    pub token: String,
}

pub fn user(role: UserRole, email: &str) -> User {
    let id = Uuid::new_v4();
    let token = issue_token(JWT_SECRET, id, role, Some(email), chrono::Duration::hours(1))
        .expect("issue token");
    User { id, token }
}

pub fn employer() -> User {
    user(UserRole::Employer, "boss@example.com")
}

pub fn freelancer() -> User {
    user(UserRole::Freelancer, "ana@example.com")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<JsonValue>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

const BOUNDARY: &str = "----marketplace-test-boundary";

pub fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

pub const APPLICATION_FIELDS: [(&str, &str); 5] = [
    ("name", "Ana Lima"),
    ("email", "ana@example.com"),
    ("phone", "+1 (555) 123-4567"),
    ("cover_letter", "I have shipped several Axum services to production."),
    ("proposed_rate", "45"),
];

pub async fn post_job(app: &Router, employer: &User, title: &str) -> Uuid {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/employer/jobs",
            Some(&employer.token),
            Some(json!({
                "title": title,
                "description": "Build and ship a small HTTP service",
                "budget_min": 500,
                "budget_max": 1500,
                "job_type": "fixed",
                "experience_level": "intermediate",
                "skills_required": ["Rust", "SQL"]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}

pub async fn apply(app: &Router, freelancer: &User, job_id: Uuid, resume: Option<(&str, &[u8])>) -> Uuid {
    let (status, body) = send(
        app,
        multipart_request(
            &format!("/api/jobs/{}/apply", job_id),
            &freelancer.token,
            &APPLICATION_FIELDS,
            resume,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}
