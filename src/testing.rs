use std::{future::Future, net::SocketAddr, pin::Pin, sync::Arc};

use async_trait::async_trait;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::{Mutex, watch},
};

use crate::{
    analysis::{AnalysisError, AnalysisPort},
    evaluation::{Evaluation, OreoAnalysis, ReflectionInput},
    sink::{SinkNotifier, SinkOutcome, SinkRecord},
};

type AnalysisFuture = Pin<Box<dyn Future<Output = Result<Evaluation, AnalysisError>> + Send>>;

pub type AnalysisHook = Arc<dyn Fn(ReflectionInput) -> AnalysisFuture + Send + Sync>;

pub fn boxed<T>(
    future: impl Future<Output = T> + Send + 'static,
) -> Pin<Box<dyn Future<Output = T> + Send>>
where
    T: Send + 'static,
{
    Box::pin(future)
}

pub fn sample_input() -> ReflectionInput {
    ReflectionInput::new(
        "1-1 홍길동",
        "",
        "오늘 배운 내용은 협동의 중요성이다. 모둠 활동에서 역할을 나누니 빨리 끝났기 때문이다.",
    )
}

pub fn sample_evaluation() -> Evaluation {
    Evaluation {
        summary: "협동의 중요성을 배웠다는 소감".to_string(),
        oreo_analysis: OreoAnalysis {
            opinion: true,
            reason: true,
            example: false,
            opinion_restated: false,
        },
        score: 62,
        constructive_feedback: "구체적인 예시를 한 가지 더 들어 보세요.".to_string(),
        encouragement: "좋은 시작이에요!".to_string(),
    }
}

/// Analysis port driven by a closure; records every input it receives.
pub struct HookAnalysis {
    hook: AnalysisHook,
    calls: Mutex<Vec<ReflectionInput>>,
}

impl HookAnalysis {
    pub fn new(hook: AnalysisHook) -> Self {
        Self {
            hook,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding(evaluation: Evaluation) -> Self {
        Self::new(Arc::new(move |_: ReflectionInput| {
            let evaluation = evaluation.clone();
            boxed(async move { Ok::<_, AnalysisError>(evaluation) })
        }))
    }

    pub fn failing(make_error: fn() -> AnalysisError) -> Self {
        Self::new(Arc::new(move |_: ReflectionInput| {
            boxed(async move { Err::<Evaluation, _>(make_error()) })
        }))
    }

    /// Holds every call until `gate` opens, then succeeds.
    pub fn gated(gate: Gate, evaluation: Evaluation) -> Self {
        Self::new(Arc::new(move |_: ReflectionInput| {
            let gate = gate.clone();
            let evaluation = evaluation.clone();
            boxed(async move {
                gate.wait().await;
                Ok::<_, AnalysisError>(evaluation)
            })
        }))
    }

    pub async fn calls(&self) -> Vec<ReflectionInput> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AnalysisPort for HookAnalysis {
    async fn analyze(&self, input: &ReflectionInput) -> Result<Evaluation, AnalysisError> {
        self.calls.lock().await.push(input.clone());
        (self.hook)(input.clone()).await
    }
}

/// One-shot latch shared between a test and a hook.
#[derive(Clone)]
pub struct Gate {
    open: Arc<watch::Sender<bool>>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    pub fn new() -> Self {
        let (open, _) = watch::channel(false);
        Self {
            open: Arc::new(open),
        }
    }

    pub fn open(&self) {
        self.open.send_replace(true);
    }

    pub async fn wait(&self) {
        let mut rx = self.open.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }
}

/// Sink that keeps what it was given. A stalled sink records the call and
/// then never returns.
pub struct RecordingSink {
    outcome: SinkOutcome,
    stalled: bool,
    records: Mutex<Vec<SinkRecord>>,
    count: watch::Sender<usize>,
}

impl RecordingSink {
    pub fn new(outcome: SinkOutcome) -> Self {
        Self {
            outcome,
            stalled: false,
            records: Mutex::new(Vec::new()),
            count: watch::channel(0).0,
        }
    }

    pub fn delivering() -> Self {
        Self::new(SinkOutcome::Delivered { status: 200 })
    }

    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::new(SinkOutcome::Skipped)
        }
    }

    pub async fn records(&self) -> Vec<SinkRecord> {
        self.records.lock().await.clone()
    }

    pub async fn wait_for_records(&self, count: usize) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|seen| *seen >= count).await;
    }
}

#[async_trait]
impl SinkNotifier for RecordingSink {
    async fn notify(&self, record: SinkRecord) -> SinkOutcome {
        let seen = {
            let mut records = self.records.lock().await;
            records.push(record);
            records.len()
        };
        self.count.send_replace(seen);
        if self.stalled {
            std::future::pending::<()>().await;
        }
        self.outcome.clone()
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Loopback HTTP/1.1 server answering every request with one canned reply.
pub struct StubHttpServer {
    address: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubHttpServer {
    pub async fn spawn(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind should succeed");
        let address = listener.local_addr().expect("local addr should exist");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = body.into();

        let captured = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let captured = Arc::clone(&captured);
                let body = body.clone();
                tokio::spawn(async move {
                    let _ = serve_one(stream, status, &body, &captured).await;
                });
            }
        });

        Self { address, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().await.clone()
    }
}

async fn serve_one(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    captured: &Mutex<Vec<CapturedRequest>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    let body_end = buffer.len().min(header_end + content_length);
    let request_body = String::from_utf8_lossy(&buffer[header_end..body_end]).to_string();

    captured.lock().await.push(CapturedRequest {
        method,
        path,
        headers,
        body: request_body,
    });

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
