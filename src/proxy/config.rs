use serde::{Deserialize, Serialize};

/// Gateway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Allow LAN access
    /// - false: bind 127.0.0.1 only (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Explicit bind host, overrides `allow_lan_access` when set
    #[serde(default)]
    pub host: Option<String>,

    /// Listen port
    pub port: u16,

    /// Backend API base URL (server-side, `API_URL`)
    pub api_url: String,

    /// Browser-facing backend URL (`NEXT_PUBLIC_API_URL`), used as fallback
    #[serde(default)]
    pub public_api_url: Option<String>,

    /// Outbound request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Inbound body limit (bytes), sized for image uploads
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Upstream proxy configuration
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    /// Enabled
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            host: None,
            port: 3001,
            api_url: "http://localhost:8000".to_string(),
            public_api_url: None,
            request_timeout: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

impl ProxyConfig {
    /// Get the actual listen address
    pub fn get_bind_address(&self) -> &str {
        if let Some(host) = self.host.as_deref() {
            return host;
        }
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }

    /// Backend base URL without trailing slash
    pub fn backend_base_url(&self) -> String {
        let base = if self.api_url.trim().is_empty() {
            self.public_api_url.as_deref().unwrap_or_default()
        } else {
            self.api_url.as_str()
        };
        base.trim_end_matches('/').to_string()
    }
}
