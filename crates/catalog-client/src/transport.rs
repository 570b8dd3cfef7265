//! HTTP transport used by [`ProductClient`](crate::ProductClient).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Options for a single API call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInit {
    pub headers: HeaderMap,
    /// Send and accept cookies for this request.
    pub with_credentials: bool,
}

/// Issues requests against logical, named APIs.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// GETs `path` under the API registered as `api_name` and returns the
    /// parsed JSON body.
    async fn get(
        &self,
        api_name: &str,
        path: &str,
        init: RequestInit,
    ) -> Result<serde_json::Value, ClientError>;
}

struct Endpoint {
    /// Endpoint without trailing `/`; request paths are appended to it.
    base: String,
    url: Url,
}

/// [`ApiTransport`] over `reqwest`.
///
/// Cookies live in a jar owned by the transport and are only consulted for
/// requests made with credentials.
pub struct RestTransport {
    client: Client,
    endpoints: HashMap<String, Endpoint>,
    cookies: Arc<Jar>,
}

impl RestTransport {
    /// Builds the transport. A `timeout_secs` of 0 disables the client timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder.build()?;

        let mut endpoints = HashMap::new();
        for api in &config.api.endpoints {
            let url = Url::parse(&api.endpoint).map_err(|e| {
                ClientError::InvalidUrl(format!("{} ({}): {}", api.endpoint, api.name, e))
            })?;
            let endpoint = Endpoint {
                base: api.endpoint.trim_end_matches('/').to_string(),
                url,
            };
            endpoints.insert(api.name.clone(), endpoint);
        }

        Ok(Self {
            client,
            endpoints,
            cookies: Arc::new(Jar::default()),
        })
    }

    fn resolve(&self, api_name: &str, path: &str) -> Result<Url, ClientError> {
        let endpoint = self
            .endpoints
            .get(api_name)
            .ok_or_else(|| ClientError::UnknownApi(api_name.to_string()))?;
        if !path.starts_with('/') {
            let message = format!("Path must start with '/': {}", path);
            return Err(ClientError::InvalidUrl(message));
        }

        let raw = format!("{}{}", endpoint.base, path);
        let url = Url::parse(&raw).map_err(|e| invalid_url(&raw, e))?;

        // The token and cookies must only ever reach the configured host.
        if !same_origin(&url, &endpoint.url) {
            let message = format!("{} leaves {}", url, endpoint.base);
            return Err(ClientError::InvalidUrl(message));
        }
        Ok(url)
    }
}

fn invalid_url(raw: &str, err: url::ParseError) -> ClientError {
    ClientError::InvalidUrl(format!("{}: {}", raw, err))
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

#[async_trait]
impl ApiTransport for RestTransport {
    async fn get(
        &self,
        api_name: &str,
        path: &str,
        init: RequestInit,
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.resolve(api_name, path)?;
        tracing::debug!("GET {} {} -> {}", api_name, path, url);

        let mut request = self.client.get(url.clone()).headers(init.headers);
        if init.with_credentials {
            if let Some(cookie) = self.cookies.cookies(&url) {
                request = request.header(COOKIE, cookie);
            }
        }

        let resp = request.send().await?;
        let status = resp.status();
        tracing::debug!("{} {} responded {}", api_name, path, status);

        if init.with_credentials {
            let mut set_cookies = resp.headers().get_all(SET_COOKIE).iter();
            self.cookies.set_cookies(&mut set_cookies, &url);
        }

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
