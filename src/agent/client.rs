//! HTTP client for the pet service, used by the tool adapter.
//!
//! Connection failures are retried a few times and then reported as
//! [`PetError::UpstreamUnavailable`]. A timeout is reported at once: the request may
//! already have reached the service, and updates are not idempotent. A 400 answer is a semantic rejection and is returned
//! straight away as [`PetError::Rejected`].

use log::{debug, warn};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::config::AgentConfig;
use crate::pet::{ActionRequest, PetError, PetResult};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Thin wrapper over `reqwest` speaking the pet service's four endpoints.
#[derive(Debug, Clone)]
pub struct PetClient {
    base_url: String,
    timeout: Duration,
    connect_retries: u32,
    client: reqwest::Client,
}

impl PetClient {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds as u64),
            connect_retries: config.connect_retries,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /pet/status` - the raw record JSON.
    pub async fn status(&self) -> PetResult<Value> {
        self.send(Method::GET, "/pet/status", None).await
    }

    /// `POST /pet/update` - the raw record JSON after the action.
    pub async fn update(&self, request: &ActionRequest) -> PetResult<Value> {
        self.send(Method::POST, "/pet/update", Some(request)).await
    }

    /// `POST /reset` - the fresh record.
    pub async fn reset(&self) -> PetResult<Value> {
        self.send(Method::POST, "/reset", None).await
    }

    /// `GET /mcp/discovery` - the service descriptor.
    pub async fn discovery(&self) -> PetResult<Value> {
        self.send(Method::GET, "/mcp/discovery", None).await
    }

    async fn send(&self, method: Method, path: &str, body: Option<&ActionRequest>) -> PetResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0u32;
        loop {
            let mut request = self.client.request(method.clone(), &url);
            if let Some(body) = body {
                request = request.json(body);
            }
            debug!("{} {} (attempt {})", method, url, attempt + 1);

            let failure = match timeout(self.timeout, request.send()).await {
                Ok(Ok(response)) => return decode(response).await,
                Ok(Err(e)) if e.is_connect() => e.to_string(),
                Ok(Err(e)) => return Err(PetError::UpstreamUnavailable(e.to_string())),
                Err(_) => {
                    return Err(PetError::UpstreamUnavailable(format!(
                        "request timeout after {}s",
                        self.timeout.as_secs()
                    )))
                }
            };

            if attempt >= self.connect_retries {
                return Err(PetError::UpstreamUnavailable(failure));
            }
            attempt += 1;
            warn!("pet service unreachable ({}), retrying {}/{}", failure, attempt, self.connect_retries);
            sleep(RETRY_BACKOFF * attempt).await;
        }
    }
}

async fn decode(response: reqwest::Response) -> PetResult<Value> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Value>()
            .await
            .map_err(|e| PetError::UpstreamUnavailable(format!("invalid response body: {}", e)));
    }
    let text = response.text().await.unwrap_or_default();
    if status == StatusCode::BAD_REQUEST {
        let detail = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.detail)
            .unwrap_or(text);
        return Err(PetError::Rejected(detail));
    }
    Err(PetError::UpstreamUnavailable(format!(
        "service returned {}: {}",
        status, text
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Raw listener counting `POST /pet/update` requests. With `reply` set it answers
    /// each one with that response, otherwise it reads and never answers.
    async fn counting_listener(reply: Option<String>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let counter = counter.clone();
                let reply = reply.clone();
                tokio::spawn(async move {
                    let mut pending = Vec::new();
                    let mut chunk = [0u8; 4096];
                    loop {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        pending.extend_from_slice(&chunk[..n]);
                        let text = String::from_utf8_lossy(&pending).to_string();
                        // Wait for the whole request: headers plus the JSON body
                        if !text.contains("\r\n\r\n") || !text.ends_with('}') {
                            continue;
                        }
                        if text.starts_with("POST /pet/update") {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                        pending.clear();
                        if let Some(reply) = &reply {
                            let _ = socket.write_all(reply.as_bytes()).await;
                        }
                    }
                });
            }
        });
        (format!("http://{}", addr), hits)
    }

    fn feed() -> ActionRequest {
        ActionRequest::new(crate::pet::Action::Feed)
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = AgentConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..AgentConfig::default()
        };
        let client = PetClient::new(&config);
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream_unavailable() {
        // Reserve a port, then free it so nothing is listening there
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let config = AgentConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            timeout_seconds: 2,
            connect_retries: 1,
        };
        let client = PetClient::new(&config);
        let err = client.status().await.unwrap_err();
        assert!(matches!(err, PetError::UpstreamUnavailable(_)), "got {:?}", err);
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn timed_out_update_is_sent_once() {
        let (base_url, hits) = counting_listener(None).await;
        let client = PetClient::new(&AgentConfig {
            base_url,
            timeout_seconds: 1,
            connect_retries: 2,
        });
        let err = client.update(&feed()).await.unwrap_err();
        assert!(matches!(err, PetError::UpstreamUnavailable(_)), "got {:?}", err);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_request_is_rejected_without_retry() {
        let body = r#"{"detail":"the egg has not hatched yet"}"#;
        let reply = format!(
            "HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let (base_url, hits) = counting_listener(Some(reply)).await;
        let client = PetClient::new(&AgentConfig {
            base_url,
            timeout_seconds: 2,
            connect_retries: 2,
        });
        match client.update(&feed()).await {
            Err(PetError::Rejected(detail)) => assert_eq!(detail, "the egg has not hatched yet"),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
