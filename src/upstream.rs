//! Shared plumbing for the weather and market-price providers

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to an external data provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// Classify a client error. `timeout` is the client's configured limit.
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        // Provider credentials travel in the query string
        let e = e.without_url();
        if e.is_timeout() {
            UpstreamError::Timeout(timeout)
        } else if e.is_decode() {
            UpstreamError::Malformed(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// HTTP client shared by all providers
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("agrosmart/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send the request, check the status and decode a JSON body
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    timeout: Duration,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;
    read_json(response, timeout).await
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    timeout: Duration,
) -> Result<T, UpstreamError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::from_reqwest(e, timeout))?;

    if !status.is_success() {
        let message = truncate(&body, 200);
        return Err(if status.as_u16() == 404 {
            UpstreamError::NotFound(message)
        } else {
            UpstreamError::Status {
                status: status.as_u16(),
                message,
            }
        });
    }

    serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 4), "abcd...");
        // Multi-byte text is cut on char boundaries
        assert_eq!(truncate("मंडी भाव", 3), "मंड...");
    }

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
        assert_eq!(
            UpstreamError::Timeout(Duration::from_secs(3)).to_string(),
            "no answer within 3s"
        );
    }

    #[tokio::test]
    async fn test_client_timeout_is_classified_as_timeout() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let limit = Duration::from_millis(100);
        let client = http_client(limit).unwrap();
        let err = fetch_json::<serde_json::Value>(client.get(format!("http://{addr}/")), limit)
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout(d) if d == limit), "{err:?}");

        server.abort();
    }
}
