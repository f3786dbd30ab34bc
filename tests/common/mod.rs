//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use ping_checker::health::Transition;
use ping_checker::probe::{Prober, ProbeError};
use ping_checker::sink::{SinkError, TransitionSink};

/// Prober that replays a per-address script, then answers `fallback`.
pub struct ScriptedProber {
    script: Mutex<HashMap<String, Vec<bool>>>,
    fallback: bool,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    pub fn new(script: &[(&str, &[bool])], fallback: bool) -> Self {
        let script = script
            .iter()
            .map(|(addr, seq)| (addr.to_string(), seq.iter().rev().copied().collect()))
            .collect();
        Self {
            script: Mutex::new(script),
            fallback,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn probe(&self, address: &str, _timeout: Duration) -> Result<bool, ProbeError> {
        self.calls.lock().unwrap().push(address.to_string());
        tokio::time::sleep(Duration::from_millis(2)).await;
        let next = self
            .script
            .lock()
            .unwrap()
            .get_mut(address)
            .and_then(|seq| seq.pop());
        Ok(next.unwrap_or(self.fallback))
    }
}

/// Sink that remembers every transition it was handed.
#[derive(Default)]
pub struct RecordingSink {
    pub transitions: Mutex<Vec<Transition>>,
}

impl RecordingSink {
    pub fn snapshot(&self) -> Vec<Transition> {
        self.transitions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransitionSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, transition: &Transition) -> Result<(), SinkError> {
        self.transitions.lock().unwrap().push(transition.clone());
        Ok(())
    }
}

/// A request seen by the capturing backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub body: String,
}

/// Start an HTTP backend that reports each request on a channel and answers
/// with the status returned by `f`.
pub async fn start_capturing_backend<F, Fut>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = u16> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let _ = tx.send(request);

                        let status = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                            status_text
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(CapturedRequest { method, target, body })
}
