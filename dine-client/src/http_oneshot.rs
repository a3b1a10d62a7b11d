//! Oneshot HTTP client - in-process calls into an axum Router
//!
//! Drives a `Router` through Tower's `oneshot` with the same headers and
//! error mapping as the network client. Used to embed the ordering flow next
//! to a local API and to run the protocol in tests without sockets.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, header};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use crate::config::DEFAULT_SESSION_HEADER;
use crate::http::{HttpClient, decode_body};
use crate::{ClientError, ClientResult};

/// Oneshot HTTP client (in-memory calls)
///
/// # Example
///
/// ```ignore
/// let router: Router = build_api().with_state(state);
/// let client = OneshotHttpClient::new(router).with_service_token("svc");
/// let catalog: CatalogPayload = client.get("/api/catalog", None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Router,
    service_token: Option<String>,
    session_header: String,
}

impl OneshotHttpClient {
    /// Wrap an initialized Router (`with_state` already applied)
    pub fn new(router: Router) -> Self {
        Self {
            router,
            service_token: None,
            session_header: DEFAULT_SESSION_HEADER.to_string(),
        }
    }

    /// Set the service bearer credential
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Body,
        session: Option<&str>,
    ) -> ClientResult<Request<Body>> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = &self.service_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(session) = session {
            builder = builder.header(self.session_header.as_str(), session);
        }

        builder
            .body(body)
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {}", e)))?;

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {}", e)))?;

        decode_body(status, &body)
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str, session: Option<&str>) -> ClientResult<T> {
        let request = self.build_request(Method::GET, path, Body::empty(), session)?;
        self.execute(request).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        session: Option<&str>,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        let request = self.build_request(Method::POST, path, Body::from(bytes), session)?;
        self.execute(request).await
    }
}
