//! Client configuration: API registry, timeout and the product route.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const DEFAULT_API_NAME: &str = "ProductAPI";
pub const DEFAULT_PRODUCT_PATH: &str = "/product";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";

const CONFIG_ENV: &str = "CATALOG_CONFIG";
const ENDPOINT_ENV: &str = "CATALOG_API_ENDPOINT";

/// One logical API and the base URL it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub name: String,
    pub endpoint: String,
}

impl ApiEndpoint {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoints: Vec<ApiEndpoint>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![ApiEndpoint::new(DEFAULT_API_NAME, DEFAULT_ENDPOINT)],
        }
    }
}

/// Where the product listing lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductRoute {
    pub api_name: String,
    pub path: String,
}

impl Default for ProductRoute {
    fn default() -> Self {
        Self {
            api_name: DEFAULT_API_NAME.to_string(),
            path: DEFAULT_PRODUCT_PATH.to_string(),
        }
    }
}

/// Configuration for the catalog client.
///
/// ```json
/// {
///   "api": {
///     "endpoints": [{ "name": "ProductAPI", "endpoint": "https://example.com/prod" }]
///   },
///   "timeoutSecs": 30,
///   "product": { "apiName": "ProductAPI", "path": "/product" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub api: ApiConfig,
    /// Request timeout in seconds; 0 means no timeout.
    pub timeout_secs: u64,
    pub product: ProductRoute,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            timeout_secs: 30,
            product: ProductRoute::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error("Failed to read", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| config_error("Failed to parse", path.display(), e))
    }

    pub fn from_json(content: &str) -> Result<Self, ClientError> {
        serde_json::from_str(content).map_err(|e| config_error("Failed to parse", "config", e))
    }

    /// Loads `path` (defaults when absent), then points the product API at
    /// `endpoint_override`. Blank values count as absent.
    pub fn from_sources(
        path: Option<&Path>,
        endpoint_override: Option<&str>,
    ) -> Result<Self, ClientError> {
        let mut config = match path {
            Some(path) if !path.as_os_str().is_empty() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Some(endpoint) = endpoint_override.map(str::trim).filter(|e| !e.is_empty()) {
            let name = config.product.api_name.clone();
            tracing::debug!("Product API {} overridden with {}", name, endpoint);
            config.set_endpoint(name, endpoint);
        }

        Ok(config)
    }

    /// [`from_sources`](Self::from_sources) fed by `CATALOG_CONFIG` and
    /// `CATALOG_API_ENDPOINT`.
    pub fn from_env() -> Result<Self, ClientError> {
        let path = std::env::var(CONFIG_ENV).ok();
        let endpoint = std::env::var(ENDPOINT_ENV).ok();
        let path = path.as_deref().map(str::trim).map(Path::new);
        Self::from_sources(path, endpoint.as_deref())
    }

    pub fn endpoint(&self, name: &str) -> Option<&ApiEndpoint> {
        self.api.endpoints.iter().find(|e| e.name == name)
    }

    /// Inserts `name`, or points an existing entry at `endpoint`.
    pub fn set_endpoint(&mut self, name: impl Into<String>, endpoint: impl Into<String>) {
        let name = name.into();
        let endpoint = endpoint.into();
        match self.api.endpoints.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.endpoint = endpoint,
            None => self.api.endpoints.push(ApiEndpoint::new(name, endpoint)),
        }
    }
}

fn config_error(action: &str, source: impl fmt::Display, err: impl fmt::Display) -> ClientError {
    ClientError::Config(format!("{} {}: {}", action, source, err))
}
