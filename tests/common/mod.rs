#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use nurture::api::ApiClient;

/// How the mock answers `/api/generate` and `/api/send-email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Healthy,
    /// `/api/send-email` answers 200 with `success: false`.
    EmailNotConfigured,
    /// `/api/send-email` answers 422 with a FastAPI validation `detail`.
    EmailAddressRejected,
    /// `/api/generate` answers 500 with a FastAPI `detail`.
    GenerateDetail500,
    /// `/api/generate` answers 200 with `success: false`.
    GenerateSoftFailure,
    /// Every endpoint answers 502 with an HTML page.
    BadGateway,
    /// Every endpoint answers 200 with a body of the wrong shape.
    Malformed,
    /// Every endpoint sleeps before answering.
    Slow,
    /// `/health` exposes SMTP credentials.
    LeakCredentials,
}

#[derive(Debug)]
pub struct MockState {
    pub behavior: Behavior,
    pub generate_bodies: Mutex<Vec<Value>>,
    pub email_bodies: Mutex<Vec<Value>>,
}

pub struct MockBackend {
    pub url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(MockState {
            behavior,
            generate_bodies: Mutex::new(Vec::new()),
            email_bodies: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/health", get(health))
            .route("/api/models", get(models))
            .route("/api/generate", post(generate))
            .route("/api/send-email", post(send_email))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(Some(&self.url)).unwrap()
    }

    /// Client whose timeouts are shorter than the `Slow` delay.
    pub fn impatient_client(&self) -> ApiClient {
        ApiClient::with_timeouts(
            Some(&self.url),
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    pub fn generate_bodies(&self) -> Vec<Value> {
        self.state.generate_bodies.lock().unwrap().clone()
    }

    pub fn email_bodies(&self) -> Vec<Value> {
        self.state.email_bodies.lock().unwrap().clone()
    }
}

async fn misbehave(behavior: Behavior) -> Option<Response> {
    match behavior {
        Behavior::BadGateway => Some(
            (StatusCode::BAD_GATEWAY, "<html><body>502 Bad Gateway</body></html>").into_response(),
        ),
        Behavior::Malformed => Some((StatusCode::OK, Json(json!({ "unexpected": true }))).into_response()),
        Behavior::Slow => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            None
        }
        _ => None,
    }
}

async fn health(State(state): State<Arc<MockState>>) -> Response {
    if let Some(response) = misbehave(state.behavior).await {
        return response;
    }
    let mut email_service = json!({
        "enabled": true,
        "configured": state.behavior != Behavior::EmailNotConfigured,
        "smtp_host": "smtp.example.com",
        "smtp_port": 587,
        "from_email": "compliments@example.com",
    });
    if state.behavior == Behavior::LeakCredentials {
        email_service["smtp_user"] = json!("mailer");
        email_service["smtp_password"] = json!("hunter2");
    }
    Json(json!({
        "status": "healthy",
        "version": "1.2.0",
        "llm": {
            "service": "ollama",
            "available": true,
            "installed_models": ["llama3.2:1b"],
            "required_model": "llama3.2:1b",
        },
        "email_service": email_service,
    }))
    .into_response()
}

async fn models(State(state): State<Arc<MockState>>) -> Response {
    if let Some(response) = misbehave(state.behavior).await {
        return response;
    }
    Json(json!({
        "available": true,
        "installed_models": ["llama3.2:1b", "gemma2:2b"],
        "required_model": "llama3.2:1b",
        "service": "ollama",
    }))
    .into_response()
}

async fn generate(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.generate_bodies.lock().unwrap().push(body.clone());
    if let Some(response) = misbehave(state.behavior).await {
        return response;
    }
    match state.behavior {
        Behavior::GenerateDetail500 => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Model llama3.2:1b is not loaded" })),
            )
                .into_response();
        }
        Behavior::GenerateSoftFailure => {
            return Json(json!({ "success": false, "error": "LLM produced an empty reply" })).into_response();
        }
        _ => {}
    }

    let name = body["recipient_name"].as_str().unwrap_or_default();
    let qualities: Vec<&str> = body["qualities"]
        .as_array()
        .map(|q| q.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let compliment = match body["context"].as_str() {
        Some(context) => format!("{}, you {} and showed how {} you are.", name, context, qualities.join(" and ")),
        None => format!("{}, you are so {}.", name, qualities.join(" and ")),
    };
    Json(json!({
        "success": true,
        "data": {
            "compliment": compliment,
            "generated_at": "2025-01-31T09:15:42.123456",
            "model": "llama3.2:1b",
        }
    }))
    .into_response()
}

async fn send_email(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.email_bodies.lock().unwrap().push(body.clone());
    if let Some(response) = misbehave(state.behavior).await {
        return response;
    }
    if state.behavior == Behavior::EmailAddressRejected {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["body", "recipient_email"],
                    "msg": "value is not a valid email address",
                    "type": "value_error.email",
                }]
            })),
        )
            .into_response();
    }
    if state.behavior == Behavior::EmailNotConfigured {
        return Json(json!({
            "success": false,
            "message": "Email service not configured",
        }))
        .into_response();
    }
    let to = body["recipient_email"].as_str().unwrap_or_default();
    Json(json!({
        "success": true,
        "message": format!("Compliment sent to {}", to),
    }))
    .into_response()
}
