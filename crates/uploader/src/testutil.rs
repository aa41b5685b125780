//! Test doubles shared by the uploader tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use relaydrop_protocol::Action;
use relaydrop_transfer::{ByteStream, ProgressSink, UploadSource};

use crate::BoxFuture;
use crate::error::UploadError;
use crate::storage::{ByteProgress, Storage};

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

enum Scripted {
    Ok(serde_json::Value),
    Err(String),
}

/// In-memory backend returning a fixed response per action.
#[derive(Default)]
pub struct MockBackend {
    responses: Mutex<HashMap<Action, Scripted>>,
    calls: Mutex<Vec<(Action, serde_json::Value)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, action: Action, value: serde_json::Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(action, Scripted::Ok(value));
    }

    pub fn fail(&self, action: Action, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(action, Scripted::Err(message.into()));
    }

    pub fn calls(&self) -> Vec<(Action, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl crate::backend::Backend for MockBackend {
    fn call(
        &self,
        action: Action,
        params: serde_json::Value,
    ) -> BoxFuture<'_, Result<serde_json::Value, UploadError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((action, params));
            match self.responses.lock().unwrap().get(&action) {
                Some(Scripted::Ok(value)) => Ok(value.clone()),
                Some(Scripted::Err(message)) => Err(UploadError::Backend(message.clone())),
                None => Err(UploadError::Backend(format!("no response for {action}"))),
            }
        })
    }
}

/// Backend scripted for a full multipart flow with `part_count` part URLs.
pub fn multipart_backend(upload_id: &str, part_count: usize) -> MockBackend {
    let backend = MockBackend::new();
    backend.respond(
        Action::CreateMultipartUpload,
        serde_json::json!({"uploadId": upload_id}),
    );
    let urls: Vec<String> = (1..=part_count)
        .map(|n| format!("https://s3.test/part/{n}"))
        .collect();
    backend.respond(
        Action::GetPresignedPartUrls,
        serde_json::json!({"urls": urls}),
    );
    backend.respond(Action::CompleteMultipartUpload, serde_json::json!({}));
    backend
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ObjectPut {
    pub url: String,
    pub content_type: String,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct PartPut {
    pub url: String,
    pub content_type: String,
    pub part_number: u32,
    pub body: Bytes,
}

#[derive(Default)]
struct StorageScript {
    fail_status: Option<u16>,
    fail_len: Option<(usize, u16)>,
    object_delay: Option<Duration>,
    part_delays: HashMap<u32, Duration>,
    omit_etag: HashSet<u32>,
}

/// In-memory storage recording successful PUTs in settle order.
#[derive(Default)]
pub struct MockStorage {
    script: Mutex<StorageScript>,
    objects: Mutex<Vec<ObjectPut>>,
    parts: Mutex<Vec<PartPut>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_status(&self, status: u16) {
        self.script.lock().unwrap().fail_status = Some(status);
    }

    pub fn fail_object_of_len(&self, len: usize, status: u16) {
        self.script.lock().unwrap().fail_len = Some((len, status));
    }

    pub fn delay_objects(&self, delay: Duration) {
        self.script.lock().unwrap().object_delay = Some(delay);
    }

    pub fn delay_part(&self, part_number: u32, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .part_delays
            .insert(part_number, delay);
    }

    pub fn omit_etag(&self, part_number: u32) {
        self.script.lock().unwrap().omit_etag.insert(part_number);
    }

    pub fn objects(&self) -> Vec<ObjectPut> {
        self.objects.lock().unwrap().clone()
    }

    pub fn parts(&self) -> Vec<PartPut> {
        self.parts.lock().unwrap().clone()
    }
}

impl Storage for MockStorage {
    fn put_object<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        source: &'a UploadSource,
        on_progress: ByteProgress,
    ) -> BoxFuture<'a, Result<(), UploadError>> {
        Box::pin(async move {
            let (delay, fail_status, fail_len) = {
                let script = self.script.lock().unwrap();
                (script.object_delay, script.fail_status, script.fail_len)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let total = source.size();
            let mut stream = source.stream(relaydrop_transfer::STREAM_CHUNK_SIZE).await?;
            let mut len = 0usize;
            while let Some(chunk) = stream.next().await {
                len += chunk?.len();
                on_progress(len as u64, total);
            }

            if let Some(status) = fail_status {
                return Err(UploadError::HttpStatus { status });
            }
            if let Some((bad_len, status)) = fail_len {
                if bad_len == len {
                    return Err(UploadError::HttpStatus { status });
                }
            }

            self.objects.lock().unwrap().push(ObjectPut {
                url: url.to_string(),
                content_type: content_type.to_string(),
                len,
            });
            Ok(())
        })
    }

    fn put_part<'a>(
        &'a self,
        url: &'a str,
        content_type: &'a str,
        part_number: u32,
        mut body: ByteStream,
        content_length: u64,
    ) -> BoxFuture<'a, Result<String, UploadError>> {
        Box::pin(async move {
            let (delay, fail_status, omit) = {
                let script = self.script.lock().unwrap();
                (
                    script.part_delays.get(&part_number).copied(),
                    script.fail_status,
                    script.omit_etag.contains(&part_number),
                )
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(status) = fail_status {
                return Err(UploadError::HttpStatus { status });
            }
            if omit {
                return Err(UploadError::MissingETag { part_number });
            }

            let mut buf = BytesMut::with_capacity(content_length as usize);
            while let Some(chunk) = body.next().await {
                buf.extend_from_slice(&chunk?);
            }
            assert_eq!(buf.len() as u64, content_length, "part {part_number} length");

            self.parts.lock().unwrap().push(PartPut {
                url: url.to_string(),
                content_type: content_type.to_string(),
                part_number,
                body: buf.freeze(),
            });
            Ok(format!("etag-{part_number}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Sink recording every update it receives.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(String, f64, Option<String>)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fractions(&self, file_id: &str) -> Vec<f64> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| id == file_id)
            .map(|(_, f, _)| *f)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, file_id: &str, fraction: f64, status: Option<&str>) {
        self.updates.lock().unwrap().push((
            file_id.to_string(),
            fraction,
            status.map(str::to_string),
        ));
    }
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

/// Canned response for [`serve`].
pub struct MockResponse {
    status: u16,
    content_type: &'static str,
    headers: Vec<(String, String)>,
    body: String,
}

impl MockResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A request captured by [`serve`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

pub struct MockServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts a mock HTTP server answering one connection per response.
pub async fn serve(responses: Vec<MockResponse>) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{port}");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    let handle = tokio::spawn(async move {
        for response in responses {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let Some(request) = read_request(&mut reader).await else {
                return;
            };
            recorded.lock().unwrap().push(request);

            let mut head = format!(
                "HTTP/1.1 {} Mock\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                response.status,
                response.content_type,
                response.body.len()
            );
            for (name, value) in &response.headers {
                head.push_str(&format!("{name}: {value}\r\n"));
            }
            head.push_str("\r\n");

            let mut stream = reader.into_inner();
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(response.body.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    MockServer {
        url,
        requests,
        handle,
    }
}

async fn read_request<R>(reader: &mut R) -> Option<RecordedRequest>
where
    R: AsyncBufReadExt + AsyncReadExt + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':')?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let find = |name: &str| {
        headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    let mut body = Vec::new();
    if let Some(len) = find("content-length").and_then(|v| v.parse::<usize>().ok()) {
        body.resize(len, 0);
        reader.read_exact(&mut body).await.ok()?;
    } else if find("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).await.ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk).await.ok()?;
            if size == 0 {
                break;
            }
            chunk.truncate(size);
            body.extend_from_slice(&chunk);
        }
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
