//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | DINE_API_URL | http://localhost:8080 | order/catalog API base URL |
//! | DINE_SERVICE_TOKEN | - | service bearer credential |
//! | DINE_REQUEST_TIMEOUT_SECS | 30 | transport timeout |
//! | DINE_SUBMIT_TIMEOUT_SECS | 15 | bounded wait for order submission |
//! | DINE_VAT_PERCENTAGE | 0 | VAT shown on the confirmation breakdown |
//! | DINE_SESSION_DIR | - | directory for session-scoped storage |
//! | DINE_SESSION_HEADER | x-session-token | session correlation header |

use std::path::PathBuf;
use std::time::Duration;

/// Default header carrying the table session token
pub const DEFAULT_SESSION_HEADER: &str = "x-session-token";

/// Client configuration for connecting to the order/catalog API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Service bearer credential for service-to-service authorization
    pub service_token: Option<String>,

    /// Transport timeout in seconds
    pub timeout: u64,

    /// Bounded wait for one order submission, in seconds
    pub submit_timeout: u64,

    /// VAT percentage applied on the confirmation breakdown
    pub vat_percentage: f64,

    /// Directory holding per-session storage files
    pub session_dir: Option<PathBuf>,

    /// Header name for the session correlation token
    pub session_header: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_token: None,
            timeout: 30,
            submit_timeout: 15,
            vat_percentage: 0.0,
            session_dir: None,
            session_header: DEFAULT_SESSION_HEADER.to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::new(
            std::env::var("DINE_API_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        Self {
            service_token: std::env::var("DINE_SERVICE_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout: std::env::var("DINE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            submit_timeout: std::env::var("DINE_SUBMIT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.submit_timeout),
            vat_percentage: std::env::var("DINE_VAT_PERCENTAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.vat_percentage),
            session_dir: std::env::var("DINE_SESSION_DIR").ok().map(PathBuf::from),
            session_header: std::env::var("DINE_SESSION_HEADER")
                .unwrap_or_else(|_| DEFAULT_SESSION_HEADER.into()),
            ..defaults
        }
    }

    /// Set the service bearer credential
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    /// Set the transport timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the submission timeout
    pub fn with_submit_timeout(mut self, seconds: u64) -> Self {
        self.submit_timeout = seconds;
        self
    }

    /// Set the VAT percentage
    pub fn with_vat_percentage(mut self, percentage: f64) -> Self {
        self.vat_percentage = percentage;
        self
    }

    /// Set the session storage directory
    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
