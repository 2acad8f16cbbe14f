use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, ORIGIN, SET_COOKIE};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{BoxError, Error, Result};

/// One call to the remote API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Value for the `Cookie` header.
    pub cookie: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `name=value` pairs from every `Set-Cookie` header.
    pub cookies: Vec<String>,
    pub body: String,
}

/// Sends API requests. Implementations own connection handling and timeouts;
/// status codes are reported, never turned into errors here.
pub trait Transport: Clone {
    fn send(&self, request: ApiRequest) -> impl Future<Output = std::result::Result<ApiResponse, BoxError>> + Send;
}

#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=UTF-8"),
        );
        let origin = HeaderValue::from_str(&config.origin)
            .map_err(|e| Error::Config(format!("Invalid origin {:?}: {}", config.origin, e)))?;
        headers.insert(ORIGIN, origin);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, BoxError> {
        let mut req = self.http.request(request.method, &request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(cookie) = &request.cookie {
            req = req.header(COOKIE, cookie);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(cookie_pair)
            .collect();
        let body = resp.text().await?;

        Ok(ApiResponse {
            status,
            cookies,
            body,
        })
    }
}

/// The `name=value` part of a `Set-Cookie` header, attributes dropped.
pub fn cookie_pair(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    if pair.contains('=') && !pair.starts_with('=') {
        Some(pair.to_string())
    } else {
        None
    }
}
