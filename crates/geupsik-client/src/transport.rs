//! Outbound request seam.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::ClientError;

/// Default NEIS open-data hub base URL.
pub const DEFAULT_BASE_URL: &str = "https://open.neis.go.kr/hub";

/// Issues a single GET against a provider endpoint and returns the body.
///
/// Non-2xx answers must be reported as [`ClientError::Server`]. Errors must
/// not mention the query string.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ClientError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// `base_url` should be like `https://open.neis.go.kr/hub` (trailing slash is trimmed).
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        // Query parameters carry the API key; only the bare URL is logged.
        info!(url = %url, "requesting provider endpoint");
        let resp = self.client.get(&url).query(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}
