use std::sync::Arc;

use reqwest::header::HeaderMap;

use crate::config::ProductRoute;
use crate::error::ClientError;
use crate::headers::build_headers;
use crate::session::SessionProvider;
use crate::transport::{ApiTransport, RequestInit};
use crate::types::ProductList;

/// Fetches the product catalog on behalf of the current user.
#[derive(Clone)]
pub struct ProductClient {
    sessions: Arc<dyn SessionProvider>,
    transport: Arc<dyn ApiTransport>,
    route: ProductRoute,
}

impl ProductClient {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        transport: Arc<dyn ApiTransport>,
        route: ProductRoute,
    ) -> Self {
        Self {
            sessions,
            transport,
            route,
        }
    }

    /// Headers the next catalog request would carry.
    pub async fn headers(&self) -> HeaderMap {
        build_headers(self.sessions.as_ref()).await
    }

    /// GETs the product listing and returns the body untouched.
    ///
    /// Transport errors are returned as they came.
    pub async fn get_products(&self) -> Result<serde_json::Value, ClientError> {
        let init = RequestInit {
            headers: self.headers().await,
            with_credentials: true,
        };
        self.transport
            .get(&self.route.api_name, &self.route.path, init)
            .await
    }

    pub async fn list_products(&self) -> Result<ProductList, ClientError> {
        let body = self.get_products().await?;
        serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    pub fn route(&self) -> &ProductRoute {
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSessionProvider;
    use async_trait::async_trait;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct RecordedCall {
        api_name: String,
        path: String,
        init: RequestInit,
    }

    /// Transport that records calls and answers from a canned result.
    struct RecordingTransport {
        calls: Mutex<Vec<RecordedCall>>,
        respond: fn() -> Result<serde_json::Value, ClientError>,
    }

    impl RecordingTransport {
        fn new(respond: fn() -> Result<serde_json::Value, ClientError>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                respond,
            })
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().expect("calls lock poisoned").clone()
        }
    }

    #[async_trait]
    impl ApiTransport for RecordingTransport {
        async fn get(
            &self,
            api_name: &str,
            path: &str,
            init: RequestInit,
        ) -> Result<serde_json::Value, ClientError> {
            let call = RecordedCall {
                api_name: api_name.to_string(),
                path: path.to_string(),
                init,
            };
            self.calls.lock().expect("calls lock poisoned").push(call);
            (self.respond)()
        }
    }

    fn catalog_body() -> Result<serde_json::Value, ClientError> {
        Ok(serde_json::json!({
            "products": [{"id": "1", "name": "Dragon Tales", "premiumOffer": true}]
        }))
    }

    fn unavailable() -> Result<serde_json::Value, ClientError> {
        Err(ClientError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        })
    }

    fn client(
        sessions: StaticSessionProvider,
        transport: Arc<RecordingTransport>,
    ) -> ProductClient {
        ProductClient::new(Arc::new(sessions), transport, ProductRoute::default())
    }

    #[tokio::test]
    async fn test_get_products_issues_single_credentialed_call() {
        let transport = RecordingTransport::new(catalog_body);
        let sessions = StaticSessionProvider::from_id_token("T");
        let expected_headers = build_headers(&sessions).await;
        let client = client(sessions, transport.clone());

        let body = client.get_products().await.expect("products fetched");
        assert_eq!(body, catalog_body().expect("canned body"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].api_name, "ProductAPI");
        assert_eq!(calls[0].path, "/product");
        assert!(calls[0].init.with_credentials);
        assert_eq!(calls[0].init.headers, expected_headers);
    }

    #[tokio::test]
    async fn test_anonymous_request_still_goes_out() {
        let transport = RecordingTransport::new(catalog_body);
        let client = client(StaticSessionProvider::anonymous(), transport.clone());

        client.get_products().await.expect("products fetched");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].init.headers.get(AUTHORIZATION).is_none());
        assert!(calls[0].init.headers.get(CONTENT_TYPE).is_some());
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unchanged() {
        let transport = RecordingTransport::new(unavailable);
        let sessions = StaticSessionProvider::from_id_token("T");
        let client = client(sessions, transport.clone());

        match client.get_products().await {
            Err(ClientError::Status { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("expected the transport's status error, got {:?}", other),
        }
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_list_products_decodes_body() {
        let transport = RecordingTransport::new(catalog_body);
        let client = client(StaticSessionProvider::anonymous(), transport);

        let list = client.list_products().await.expect("catalog decoded");
        assert_eq!(list.products.len(), 1);
        assert_eq!(list.products[0].name.as_deref(), Some("Dragon Tales"));
        assert!(list.products[0].premium_offer);
    }

    #[tokio::test]
    async fn test_list_products_rejects_unexpected_shape() {
        fn wrong_shape() -> Result<serde_json::Value, ClientError> {
            Ok(serde_json::json!({"products": "none"}))
        }
        let transport = RecordingTransport::new(wrong_shape);
        let client = client(StaticSessionProvider::anonymous(), transport);

        let result = client.list_products().await;
        assert!(matches!(result, Err(ClientError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_custom_route_is_used() {
        let transport = RecordingTransport::new(catalog_body);
        let route = ProductRoute {
            api_name: "BooksAPI".to_string(),
            path: "/books".to_string(),
        };
        let client = ProductClient::new(
            Arc::new(StaticSessionProvider::anonymous()),
            transport.clone(),
            route,
        );

        client.get_products().await.expect("products fetched");
        let calls = transport.calls();
        assert_eq!(calls[0].api_name, "BooksAPI");
        assert_eq!(calls[0].path, "/books");
        assert_eq!(client.route().path, "/books");
    }
}
