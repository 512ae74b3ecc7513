//! In-process stub of the design backend for integration tests.
//!
//! Serves the same routes as the real backend under `/api` on an
//! ephemeral port. Job ids are handed out from a queue, job statuses are
//! replayed from per-job scripts, and every request is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use designflow_client::poller::PollConfig;
use designflow_core::layout::LayoutConfig;
use designflow_studio::config::StudioConfig;
use designflow_studio::session::DesignSession;

pub const TOKEN: &str = "test-token";

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub route: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct StubBackend {
    job_ids: Mutex<VecDeque<String>>,
    statuses: Mutex<HashMap<String, VecDeque<Value>>>,
    requests: Mutex<Vec<Recorded>>,
    pub reject_generation: AtomicBool,
    pub fail_actions: AtomicBool,
}

impl StubBackend {
    /// Queue a job: the next accepted generation gets `job_id`, and its
    /// status checks replay `statuses` (then report `processing`).
    pub fn job(&self, job_id: &str, statuses: Vec<Value>) {
        self.job_ids.lock().unwrap().push_back(job_id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .insert(job_id.to_string(), statuses.into());
    }

    /// Queue a job id the status endpoint does not know about.
    pub fn job_without_status(&self, job_id: &str) {
        self.job_ids.lock().unwrap().push_back(job_id.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, route: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.route == route)
            .collect()
    }

    fn record(&self, route: impl Into<String>, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            route: route.into(),
            authorization,
            body,
        });
    }

    fn accept_job(&self) -> (StatusCode, Json<Value>) {
        if self.reject_generation.load(Ordering::SeqCst) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing design description"})),
            );
        }
        match self.job_ids.lock().unwrap().pop_front() {
            Some(job_id) => (
                StatusCode::ACCEPTED,
                Json(json!({"job_id": job_id, "message": "Generation started"})),
            ),
            None => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "No job queued"})),
            ),
        }
    }

    fn action_response(&self) -> (StatusCode, Json<Value>) {
        if self.fail_actions.load(Ordering::SeqCst) {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "storage unavailable"})),
            )
        } else {
            (StatusCode::OK, Json(json!({"status": "success", "message": "ok"})))
        }
    }
}

pub fn processing() -> Value {
    json!({"status": "processing"})
}

pub fn succeeded(images: Value) -> Value {
    json!({"status": "succeeded", "images": images})
}

type Shared = State<Arc<StubBackend>>;

async fn generate(
    State(stub): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record("/generate", &headers, body);
    stub.accept_job()
}

async fn generate_variants(
    State(stub): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record("/generate/variants", &headers, body);
    stub.accept_job()
}

async fn job_status(
    State(stub): Shared,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    stub.record(format!("/jobs/{job_id}/status"), &headers, Value::Null);
    let mut statuses = stub.statuses.lock().unwrap();
    match statuses.get_mut(&job_id) {
        Some(script) => {
            let mut status = script.pop_front().unwrap_or_else(processing);
            status["job_id"] = json!(job_id);
            (StatusCode::OK, Json(status))
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Unknown job"}))),
    }
}

async fn feedback(
    State(stub): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record("/feedback", &headers, body);
    stub.action_response()
}

async fn save_design(
    State(stub): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.record("/designs/save", &headers, body);
    stub.action_response()
}

/// Serve the stub on `127.0.0.1:0`. Returns the API base URL.
pub async fn spawn_stub(stub: Arc<StubBackend>) -> String {
    let api = Router::new()
        .route("/generate", post(generate))
        .route("/generate/variants", post(generate_variants))
        .route("/jobs/{job_id}/status", get(job_status))
        .route("/feedback", post(feedback))
        .route("/designs/save", post(save_design))
        .with_state(stub);
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api")
}

/// Build a session against `api_url` with fast polling and a bearer token.
pub fn test_session(api_url: String) -> DesignSession {
    let config = StudioConfig {
        api_url,
        api_token: Some(TOKEN.to_string()),
        request_timeout_secs: 5,
        poll: PollConfig {
            interval: Duration::from_millis(20),
            max_attempts: Some(100),
        },
        layout: LayoutConfig::default(),
    };
    DesignSession::from_config(&config).unwrap()
}
