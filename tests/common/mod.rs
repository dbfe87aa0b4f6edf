#![allow(dead_code)]

use async_trait::async_trait;
use mimescraper::enrich::{EnrichError, NameGenerator};
use mimescraper::store::{RecordStore, StoreError, UpsertResponse};
use mimescraper::MimeRecord;
use std::collections::{BTreeMap, HashSet};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

// =============================================================================
// Canned HTTP responder
// =============================================================================

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Canned {
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "application/json", body)
    }

    pub fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Serves the given responses in order, one per connection; the last one
/// repeats once the list is exhausted.
pub struct TestServer {
    base: Url,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl TestServer {
    pub async fn start(responses: Vec<Canned>) -> Self {
        assert!(!responses.is_empty(), "need at least one canned response");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let served = AtomicUsize::new(0);

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let Ok(req) = read_request(&mut stream).await else {
                    continue;
                };
                captured.lock().unwrap().push(req);

                let idx = served.fetch_add(1, Ordering::SeqCst).min(responses.len() - 1);
                let _ = write_response(&mut stream, &responses[idx]).await;
            }
        });

        Self {
            base: Url::parse(&format!("http://{}/", addr)).unwrap(),
            requests,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/all-types", addr)).unwrap()
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..end]).to_string();

    Ok(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}

async fn write_response(stream: &mut TcpStream, canned: &Canned) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        canned.status,
        canned.content_type,
        canned.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(canned.body.as_bytes()).await?;
    stream.shutdown().await
}

/// Minimal chat-completion body with a single choice.
pub fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

// =============================================================================
// Fakes
// =============================================================================

/// Names every MIME type `"<mime> label"`, optionally failing on one of them.
#[derive(Default)]
pub struct FakeNamer {
    pub fail_on: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeNamer {
    pub fn failing_on(mime: &str) -> Self {
        Self {
            fail_on: Some(mime.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NameGenerator for FakeNamer {
    async fn generate_name(&self, mime: &str) -> Result<String, EnrichError> {
        self.calls.lock().unwrap().push(mime.to_string());
        if self.fail_on.as_deref() == Some(mime) {
            return Err(EnrichError::Api {
                status: 429,
                body: "rate limited".into(),
            });
        }
        Ok(format!("{} label", mime))
    }
}

/// Keyed by `mime` like the real table's unique constraint.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<BTreeMap<String, MimeRecord>>,
    pub attempts: Mutex<Vec<String>>,
    pub reject: HashSet<String>,
    pub silent: HashSet<String>,
}

impl MemoryStore {
    pub fn rejecting(mimes: &[&str]) -> Self {
        Self {
            reject: mimes.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn silent_for(mimes: &[&str]) -> Self {
        Self {
            silent: mimes.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn row(&self, mime: &str) -> Option<MimeRecord> {
        self.rows.lock().unwrap().get(mime).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert_record(&self, record: &MimeRecord) -> Result<UpsertResponse, StoreError> {
        self.attempts.lock().unwrap().push(record.mime.clone());
        if self.reject.contains(&record.mime) {
            return Err(StoreError::Api {
                status: 409,
                body: "constraint violation".into(),
            });
        }
        if self.silent.contains(&record.mime) {
            return Ok(UpsertResponse { data: None });
        }
        self.rows
            .lock()
            .unwrap()
            .insert(record.mime.clone(), record.clone());
        Ok(UpsertResponse {
            data: Some(vec![serde_json::to_value(record).unwrap()]),
        })
    }
}
