//! HTTP transport
//!
//! [`HttpClient`] abstracts the wire so the ordering flow can run against the
//! real API ([`NetworkHttpClient`]) or an in-process router
//! ([`crate::OneshotHttpClient`]).

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// Error body returned by the API
#[derive(serde::Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// HTTP client trait
///
/// `session` is the table session token, sent out-of-band in the session
/// header next to the service bearer credential.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str, session: Option<&str>) -> ClientResult<T>;

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        session: Option<&str>,
    ) -> ClientResult<T>;
}

/// Map a finished response onto `T` or a [`ClientError`]
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ClientResult<T> {
    if !status.is_success() {
        let text = String::from_utf8_lossy(body).to_string();
        // Structured API error first
        if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
            return Err(ClientError::Api {
                code: api_err.code,
                message: api_err.message,
                details: api_err.details,
            });
        }
        return match status {
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(text)),
            StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
            StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
            _ => Err(ClientError::Internal(format!("{}: {}", status, text))),
        };
    }
    serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    service_token: Option<String>,
    session_header: String,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_token: config.service_token.clone(),
            session_header: config.session_header.clone(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn decorate(
        &self,
        mut req: reqwest::RequestBuilder,
        session: Option<&str>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = &self.service_token {
            req = req.bearer_auth(token);
        }
        if let Some(session) = session {
            req = req.header(self.session_header.as_str(), session);
        }
        req
    }

    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        decode_body(status, &body)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str, session: Option<&str>) -> ClientResult<T> {
        let req = self.decorate(self.client.get(self.url(path)), session);
        self.execute(req).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        session: Option<&str>,
    ) -> ClientResult<T> {
        let req = self.decorate(self.client.post(self.url(path)).json(body), session);
        self.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join() {
        let client = NetworkHttpClient::new(&ClientConfig::new("http://api.local/")).unwrap();
        assert_eq!(client.base_url(), "http://api.local");
        assert_eq!(client.url("/api/catalog"), "http://api.local/api/catalog");
        assert_eq!(client.url("api/orders"), "http://api.local/api/orders");
    }

    #[test]
    fn test_decode_structured_error() {
        let body = br#"{"code":1005,"message":"Session has ended"}"#;
        let err = decode_body::<serde_json::Value>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, ClientError::Api { code: 1005, .. }));
    }

    #[test]
    fn test_decode_plain_errors_by_status() {
        let err = decode_body::<serde_json::Value>(StatusCode::NOT_FOUND, b"missing").unwrap_err();
        assert!(matches!(err, ClientError::NotFound(ref t) if t == "missing"));

        let err = decode_body::<serde_json::Value>(StatusCode::BAD_GATEWAY, b"").unwrap_err();
        assert!(matches!(err, ClientError::Internal(_)));
    }

    #[test]
    fn test_decode_success_body() {
        let value: Vec<i32> = decode_body(StatusCode::OK, b"[1,2]").unwrap();
        assert_eq!(value, vec![1, 2]);
        let err = decode_body::<Vec<i32>>(StatusCode::OK, b"{").unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
