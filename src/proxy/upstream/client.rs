// Upstream client: forwards gateway requests to the backend API

use axum::http::{header, HeaderMap, HeaderName, Method};
use bytes::Bytes;
use reqwest::{Client, Response};

/// Inbound headers that survive forwarding; everything else is dropped
pub const FORWARDED_HEADERS: [HeaderName; 3] = [
    header::AUTHORIZATION,
    header::USER_AGENT,
    header::CONTENT_TYPE,
];

pub struct UpstreamClient {
    http_client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(http_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build backend URL
    ///
    /// `path` is relative to the base URL; the query string is passed through verbatim
    pub fn build_url(&self, path: &str, query_string: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query_string.filter(|q| !q.is_empty()) {
            Some(qs) => format!("{}/{}?{}", self.base_url, path, qs),
            None => format!("{}/{}", self.base_url, path),
        }
    }

    /// Copy only allow-listed headers from the inbound request
    pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in FORWARDED_HEADERS.iter() {
            if let Some(value) = inbound.get(name) {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }

    /// Forward a request to the backend
    ///
    /// Bodies are sent raw, so multipart uploads keep their boundary through `Content-Type`
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        query_string: Option<&str>,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Response, reqwest::Error> {
        let url = self.build_url(path, query_string);
        tracing::debug!("Forwarding {} {}", method, url);

        let mut request = self
            .http_client
            .request(method, &url)
            .headers(Self::forwarded_headers(inbound_headers));

        if !body.is_empty() {
            request = request.body(body);
        }

        request.send().await
    }
}
