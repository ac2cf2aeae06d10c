use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{url} returned HTTP {status}: {message}")]
    Status { status: u16, url: String, message: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request { source, .. } => source.status().map(|s| s.as_u16()),
            TransportError::Decode { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Network trouble, throttling and server errors may succeed on a later
    /// attempt; client errors and undecodable bodies will not.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request() || source.is_body()
            }
            TransportError::Decode { .. } => false,
        }
    }
}

/// One GET against the catalog, returning the decoded JSON body.
///
/// `url` carries no query string; `query` holds every parameter, including
/// the API key, so implementations must not log it verbatim.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<serde_json::Value, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("movieverse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<serde_json::Value, TransportError> {
        // reqwest embeds the full URL (query and key included) in its errors
        let request_error = |source: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            source: source.without_url(),
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        trace!(url = %url, status = %status, "Catalog response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message: status_message(&body),
            });
        }

        response.json::<serde_json::Value>().await.map_err(|e| {
            if e.is_decode() {
                TransportError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                request_error(e)
            }
        })
    }
}

/// TMDB error bodies look like `{"status_code": 7, "status_message": "..."}`.
fn status_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["status_message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            url: "https://api.example/3/movie/popular".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(401).is_transient());
        assert!(!status(404).is_transient());
        assert!(!TransportError::Decode {
            url: String::new(),
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(status(401).is_unauthorized());
        assert!(!status(403).is_unauthorized());
    }

    #[test]
    fn test_status_message_prefers_tmdb_field() {
        let body = r#"{"status_code": 7, "status_message": "Invalid API key: You must be granted a valid key.", "success": false}"#;
        assert_eq!(status_message(body), "Invalid API key: You must be granted a valid key.");
        assert_eq!(status_message("Bad Gateway"), "Bad Gateway");
    }
}
