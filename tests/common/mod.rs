//! Shared test infrastructure for integration tests.
//!
//! Every test gets its own state directory and, when it talks to the backend,
//! its own loopback axum stub, so tests can run in parallel.
#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;
use tokio::sync::oneshot;

pub const EMAIL: &str = "asha@example.org";

/// Proxy variables are cleared so requests to the loopback stub go direct.
const PROXY_VARS: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

/// Result of one `confreg` invocation.
#[derive(Debug)]
pub struct RunOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// A request captured by [`MockBackend`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub target: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == &name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct StubState {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Loopback axum server standing in for the hosted backend.
pub struct MockBackend {
    url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub fn start(
        responder: impl Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    ) -> Self {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            responder: Arc::new(responder),
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(record_and_respond).with_state(state);
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("build stub runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("adopt listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown_signal.await;
                    })
                    .await
                    .expect("serve stub backend");
            });
        });

        Self {
            url: format!("http://{addr}"),
            requests,
            shutdown: Some(shutdown),
        }
    }

    /// Backend answering every request with the same status and body.
    pub fn always(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Requests are recorded before the response is returned, so they are
/// visible as soon as the client process has exited.
async fn record_and_respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let target = uri
        .path_and_query()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let request = RecordedRequest {
        method: method.as_str().to_string(),
        target,
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).to_string(),
    };
    let (status, response_body) = (state.responder)(&request);
    state.requests.lock().expect("requests lock").push(request);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response_body,
    )
}

/// Isolated state directory plus the environment `confreg` runs with.
pub struct TestFixture {
    state: TempDir,
    backend_url: String,
    require_verification: bool,
}

impl TestFixture {
    /// Fixture whose backend URL points at a closed port.
    pub fn new() -> Self {
        Self {
            state: TempDir::new().expect("create state dir"),
            backend_url: "http://127.0.0.1:9".to_string(),
            require_verification: true,
        }
    }

    pub fn with_backend(backend: &MockBackend) -> Self {
        Self {
            backend_url: backend.url().to_string(),
            ..Self::new()
        }
    }

    pub fn without_verification(mut self) -> Self {
        self.require_verification = false;
        self
    }

    pub fn state_dir(&self) -> &Path {
        self.state.path()
    }

    pub fn run(&self, args: &[&str]) -> RunOutput {
        let mut command = Command::new(env!("CARGO_BIN_EXE_confreg"));
        command
            .args(args)
            .env("CONFREG_HOME", self.state.path())
            .env("CONFREG_SUPABASE_URL", &self.backend_url)
            .env("CONFREG_SUPABASE_ANON_KEY", "test-anon-key")
            .env("CONFREG_REDIRECT_URL", "https://conf.example.org/registration")
            .env(
                "CONFREG_REQUIRE_VERIFICATION",
                if self.require_verification {
                    "true"
                } else {
                    "false"
                },
            )
            .env_remove("RUST_LOG");
        for var in PROXY_VARS {
            command.env_remove(var);
        }
        let output = command.output().expect("run confreg");
        RunOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Run and require a zero exit status.
    pub fn run_ok(&self, args: &[&str]) -> RunOutput {
        let output = self.run(args);
        assert!(
            output.success,
            "confreg {args:?} failed\nstdout:\n{}\nstderr:\n{}",
            output.stdout, output.stderr
        );
        output
    }

    /// Write a small proof-of-payment image and return its path.
    pub fn write_proof(&self, name: &str, size: usize) -> PathBuf {
        let path = self.state.path().join(name);
        std::fs::write(&path, vec![0u8; size]).expect("write proof file");
        path
    }

    /// Fill every field with valid values through the CLI.
    pub fn fill_valid_draft(&self) {
        let fields = [
            ("name", "Asha Rao"),
            ("nationality", "Indian"),
            ("email", EMAIL),
            ("phone", "+91 98765 43210"),
            ("affiliation", "Faculty"),
            ("place_of_affiliation", "Bangalore"),
            ("institution", "BNMIT"),
            ("country", "india"),
            ("paper_title", "Digital Strategy in SMEs"),
            ("track_number", "track1"),
            ("paper_id", "ICSM-042"),
            ("accommodation", "yes"),
            ("amount_paid", "faculty-indian-early"),
            ("payment_account", "asha@upi"),
            ("transaction_id", "TXN123456"),
        ];
        for (field, value) in fields {
            self.run_ok(&["set", field, value]);
        }
        let proof = self.write_proof("receipt.png", 2048);
        self.run_ok(&["attach", proof.to_str().expect("utf-8 path")]);
    }

    /// Parsed local storage file (empty object when nothing was written yet).
    pub fn storage(&self) -> serde_json::Value {
        let path = self.state.path().join("storage.json");
        match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).expect("storage is JSON"),
            Err(_) => serde_json::json!({}),
        }
    }

    pub fn status_json(&self) -> serde_json::Value {
        let output = self.run_ok(&["status", "--json", "--all"]);
        serde_json::from_str(&output.stdout).expect("status JSON")
    }
}
