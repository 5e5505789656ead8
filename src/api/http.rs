//! reqwest implementation of the API gateway

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::api::{ApiTransport, Method};
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{ApiEnvelope, ApiResponse};
use crate::storage::LocalState;

/// HTTP client for the campaign API.
///
/// Attaches the cached bearer token to every request. When the server answers
/// `401` the cached session is cleared and the rejection is signalled through
/// [`LocalState::signal_session_rejected`]. Redirecting to a login screen is
/// left to the caller.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    local: LocalState,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, local: LocalState) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            local,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn bearer_token(&self) -> Option<String> {
        match self.local.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read session token, sending request without it");
                None
            }
        }
    }

    fn decode(status: u16, bytes: &[u8]) -> ClientResult<ApiEnvelope> {
        if bytes.is_empty() {
            return Ok(ApiEnvelope::default());
        }

        serde_json::from_slice(bytes).map_err(|e| {
            if status >= 500 {
                ClientError::Transport(format!("server returned status {}", status))
            } else {
                ClientError::MalformedPayload(format!("response is not an envelope: {}", e))
            }
        })
    }
}

#[async_trait]
impl ApiTransport for HttpApiClient {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.bearer_token().await;
        debug!(method = %method, url = %url, auth = token.is_some(), "API request");

        let mut request = self.client.request(method.into(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "API request failed");
            ClientError::from(e)
        })?;

        let status = response.status().as_u16();
        if status == 401 {
            warn!(method = %method, url = %url, "Unauthorized, clearing cached session");
            if let Err(e) = self.local.clear_session().await {
                error!(error = %e, "Could not clear cached session");
            }
            self.local.signal_session_rejected();
        }

        let bytes = response.bytes().await?;
        let envelope = Self::decode(status, &bytes)?;
        debug!(method = %method, url = %url, status, success = envelope.success, "API response");

        Ok(ApiResponse::new(status, envelope))
    }
}
