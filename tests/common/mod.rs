//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

use interaction_logger::completion::{CompletionError, CompletionInvoker};
use interaction_logger::config::AppConfig;
use interaction_logger::health::ConnectivityProbe;
use interaction_logger::http::{AppState, HttpServer};
use interaction_logger::trace::{SpanExporter, TraceError, TraceScope, TraceSpan};
use interaction_logger::InteractionRecorder;

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request line and headers, lowercased.
    pub head: String,
    pub body: String,
}

#[allow(dead_code)]
impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock backend that answers every request with `f(request)`.
#[allow(dead_code)]
pub async fn start_programmable_backend<F>(f: F) -> MockBackend
where
    F: Fn(&CapturedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let captured = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let captured = captured.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(&request);
                        captured.lock().unwrap().push(request);

                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend { addr, requests }
}

/// Start a backend that accepts connections, reads the request, and never
/// answers.
#[allow(dead_code)]
pub async fn start_silent_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let captured = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let captured = captured.clone();
            tokio::spawn(async move {
                if let Some(request) = read_request(&mut socket).await {
                    captured.lock().unwrap().push(request);
                }
                // Hold the connection open.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                drop(socket);
            });
        }
    });

    MockBackend { addr, requests }
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(head_end + content_length);
    Some(CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buf[head_end..body_end]).to_string(),
    })
}

/// Completion stub that counts calls.
pub struct CountingCompletion {
    pub calls: AtomicUsize,
    reply: Result<String, String>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl CountingCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
            delay: None,
        })
    }

    pub fn replying_after(text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
            delay: Some(delay),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Err(message.to_string()),
            delay: None,
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionInvoker for CountingCompletion {
    async fn complete(&self, _question: &str, _response: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(CompletionError::Transport(message.clone())),
        }
    }
}

/// Exporter that keeps every span it is given, optionally after a delay.
#[derive(Default)]
pub struct CollectingExporter {
    pub spans: Mutex<Vec<TraceSpan>>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl CollectingExporter {
    pub fn delayed(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            spans: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    pub fn count(&self) -> usize {
        self.spans.lock().unwrap().len()
    }

    pub fn names(&self) -> Vec<String> {
        self.spans.lock().unwrap().iter().map(|s| s.name.clone()).collect()
    }
}

#[async_trait]
impl SpanExporter for CollectingExporter {
    async fn export(&self, span: &TraceSpan) -> Result<(), TraceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.spans.lock().unwrap().push(span.clone());
        Ok(())
    }
}

/// Build state wired to test collaborators.
#[allow(dead_code)]
pub fn test_state(
    config: &AppConfig,
    completion: Option<Arc<CountingCompletion>>,
    exporter: Arc<CollectingExporter>,
) -> AppState {
    let probe = ConnectivityProbe::new(Arc::new(config.clone()));
    let completion = completion.map(|c| c as Arc<dyn CompletionInvoker>);
    let recorder = InteractionRecorder::new(probe, TraceScope::new(exporter.clone()), completion);
    AppState::new(recorder, config)
}

/// Router wired to test collaborators.
#[allow(dead_code)]
pub fn test_router(
    config: &AppConfig,
    completion: Option<Arc<CountingCompletion>>,
) -> (Router, Arc<CollectingExporter>) {
    let exporter = Arc::new(CollectingExporter::default());
    let router = test_router_with_exporter(config, completion, exporter.clone());
    (router, exporter)
}

/// Router wired to test collaborators and a caller-supplied exporter.
#[allow(dead_code)]
pub fn test_router_with_exporter(
    config: &AppConfig,
    completion: Option<Arc<CountingCompletion>>,
    exporter: Arc<CollectingExporter>,
) -> Router {
    let state = test_state(config, completion, exporter);
    HttpServer::with_state(config.clone(), state).router()
}

/// Drive one request through the router in-process.
#[allow(dead_code)]
pub async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}
