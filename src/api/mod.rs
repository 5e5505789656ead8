//! Remote API gateway
//!
//! Everything the client knows about the network goes through
//! [`ApiTransport`]. The production implementation is [`HttpApiClient`].

pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ClientResult;
use crate::models::ApiResponse;

pub use http::HttpApiClient;

/// HTTP verbs used by the campaign API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One request/response exchange with the API.
///
/// Implementations return `Ok` for every response that carried an envelope,
/// including `success: false` ones; `Err` is reserved for transport failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<ApiResponse>;
}

/// Serialize a request body
pub fn body<T: Serialize>(value: &T) -> ClientResult<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}
