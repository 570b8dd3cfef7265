//! Request header assembly.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::session::SessionProvider;

/// Builds the headers for one catalog request.
///
/// Always carries `Content-Type: application/json`. When the provider has a
/// session, its ID token is added verbatim as `Authorization`. A provider
/// failure is logged and the request proceeds anonymously; this function
/// itself never fails.
pub async fn build_headers(sessions: &dyn SessionProvider) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let session = match sessions.current_session().await {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::error!("Error getting current session: {}", e);
            None
        }
    };

    if let Some(session) = session {
        let Ok(mut value) = HeaderValue::from_str(session.id_token().jwt_token()) else {
            tracing::warn!("ID token is not a valid header value, sending anonymously");
            return headers;
        };
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    headers
}
