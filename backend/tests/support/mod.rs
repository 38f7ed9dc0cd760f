//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; each
//! one pulls this module in with `mod support;` and uses what it needs.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use bookmd::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

/// A migrated SQLite database in a temporary directory.
pub struct TestDatabase {
    pub pool: DbPool,
    pub url: String,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = dir.path().join("notes.db").to_string_lossy().into_owned();
        run_migrations(&url).await.expect("migrations apply");
        let pool = DbPool::new(PoolConfig::new(&url))
            .await
            .expect("pool builds");
        Self {
            pool,
            url,
            _dir: dir,
        }
    }
}

/// Chat-completion body carrying a single choice with `content`.
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

/// Chat-completion body without any choices.
pub fn no_choices() -> Value {
    json!({ "id": "chatcmpl-test", "object": "chat.completion", "choices": [] })
}

/// Request observed by [`FakeProvider`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct ProviderState {
    status: u16,
    reply: Value,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

async fn chat_completions(
    state: web::Data<ProviderState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(CapturedRequest {
            authorization,
            body: body.into_inner(),
        });
    let status = actix_web::http::StatusCode::from_u16(state.status).expect("valid status");
    HttpResponse::build(status).json(&state.reply)
}

/// In-process OpenAI-compatible provider listening on an ephemeral port.
pub struct FakeProvider {
    base_url: Url,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: ServerHandle,
}

impl FakeProvider {
    /// Answer every `POST /v1/chat/completions` with `status` and `reply`.
    pub fn start(status: u16, reply: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(ProviderState {
            status,
            reply,
            requests: requests.clone(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/v1/chat/completions", web::post().to(chat_completions))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .expect("listen on ephemeral port")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        let base_url = Url::parse(&format!("http://127.0.0.1:{port}/v1/")).expect("valid URL");
        Self {
            base_url,
            requests,
            handle,
        }
    }

    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
