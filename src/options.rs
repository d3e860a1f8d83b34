//! Handler configuration and transport options.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Configuration of a [`NebiusHandler`](crate::providers::NebiusHandler).
///
/// Immutable once handed to the handler. A missing API key is only reported
/// when the client is first needed.
#[derive(Clone, Default)]
pub struct NebiusOptions {
    /// Nebius AI Studio API key.
    pub api_key: Option<String>,

    /// Model identifier, e.g. `"deepseek-ai/DeepSeek-R1"`.
    /// Unknown ids fall back to the default model.
    pub api_model_id: Option<String>,

    /// Override of the API base URL (proxies, tests).
    pub base_url: Option<String>,

    /// Transport configuration for the underlying HTTP client.
    pub transport: TransportOptions,
}

impl fmt::Debug for NebiusOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NebiusOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_model_id", &self.api_model_id)
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .finish()
    }
}

impl NebiusOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `NEBIUS_API_KEY`, `NEBIUS_MODEL_ID` and `NEBIUS_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("NEBIUS_API_KEY"),
            api_model_id: env_string("NEBIUS_MODEL_ID"),
            base_url: env_string("NEBIUS_BASE_URL"),
            transport: TransportOptions::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.api_model_id = Some(model_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Transport configuration options.
///
/// Controls how requests are sent over the network.
#[derive(Debug, Clone)]
pub enum TransportOptions {
    /// HTTP transport configuration
    Http {
        /// Request timeout. If None, default client timeout is used.
        timeout: Option<Duration>,
        /// HTTP proxy URL.
        proxy: Option<String>,
        /// Additional HTTP headers to send with every request.
        headers: Option<HashMap<String, String>>,
    },
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions::Http {
            timeout: None,
            proxy: None,
            headers: None,
        }
    }
}

impl TransportOptions {
    /// Create new default HTTP transport options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        match &mut self {
            TransportOptions::Http { timeout, .. } => *timeout = Some(duration),
        }
        self
    }

    /// Set the proxy.
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        match &mut self {
            TransportOptions::Http { proxy, .. } => *proxy = Some(proxy_url),
        }
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        match &mut self {
            TransportOptions::Http { headers, .. } => {
                headers.get_or_insert_with(HashMap::new).insert(key, value);
            }
        }
        self
    }
}
