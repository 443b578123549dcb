//! Shared utilities for integration tests.
//!
//! A programmable mock of the upstream employee API, served from a raw
//! `TcpListener` on an ephemeral port.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Mock upstream; each request is answered by the responder closure
pub struct MockUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    /// Starts the mock. The responder receives method and path and returns
    /// the status code and JSON body to send.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
    {
        Self::start_with_reason(move |method, path| {
            let (status, body) = responder(method, path);
            (status, reason(status).to_string(), body)
        })
        .await
    }

    /// Like `start`, but the responder also picks the status line's reason phrase
    pub async fn start_with_reason<F>(responder: F) -> Self
    where
        F: Fn(&str, &str) -> (u16, String, String) + Send + Sync + 'static,
    {
        let responder = Arc::new(responder);
        Self::serve(move |socket, log| {
            let responder = Arc::clone(&responder);
            async move { handle(socket, responder.as_ref(), &log).await }
        })
        .await
    }

    /// Starts a mock that reads each request and never answers it
    pub async fn start_silent() -> Self {
        Self::serve(|mut socket, log| async move {
            if let Some(request) = read_request(&mut socket).await {
                log.lock().unwrap().push(request);
            }
            tokio::time::sleep(Duration::from_secs(3600)).await;
            drop(socket);
        })
        .await
    }

    async fn serve<H, Fut>(handler: H) -> Self
    where
        H: Fn(TcpStream, Arc<Mutex<Vec<Recorded>>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        tokio::spawn(handler(socket, Arc::clone(&log)));
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, requests }
    }

    /// Base URL to configure the client with
    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1/", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received for a method and path
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle<F>(mut socket: TcpStream, responder: &F, log: &Mutex<Vec<Recorded>>)
where
    F: Fn(&str, &str) -> (u16, String, String),
{
    let Some(request) = read_request(&mut socket).await else {
        return;
    };

    let (status, reason, body) = responder(&request.method, &request.path);
    log.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Reads the request head and, when a Content-Length is given, the body
async fn read_request(socket: &mut TcpStream) -> Option<Recorded> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = (head_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[head_end..body_end]).to_string();

    Some(Recorded { method, path, body })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A base URL nothing is listening on
#[allow(dead_code)]
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1/", addr)
}

/// JSON for one upstream employee record
#[allow(dead_code)]
pub fn employee_json(id: u32, name: &str, salary: u64, age: u32) -> String {
    format!(
        r#"{{"id":{},"employee_name":"{}","employee_salary":{},"employee_age":{},"profile_image":""}}"#,
        id, name, salary, age
    )
}

/// A successful list body with the given records
#[allow(dead_code)]
pub fn list_body(records: &[String]) -> String {
    format!(
        r#"{{"status":"success","data":[{}],"message":"Successfully! All records has been fetched."}}"#,
        records.join(",")
    )
}
