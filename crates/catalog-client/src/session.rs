//! Sessions and the identity providers that hand them out.
//!
//! A [`Session`] is read-only as far as this crate is concerned: providers
//! are asked for it on every request and nothing here caches or refreshes
//! it.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Source of the current authentication session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Returns the signed-in user's session, or why there is none.
    async fn current_session(&self) -> Result<Session, SessionError>;
}

/// ID token issued by the identity provider, a JWT in practice.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdToken(String);

impl IdToken {
    pub fn new(jwt: impl Into<String>) -> Self {
        Self(jwt.into())
    }

    /// Raw token string, exactly as it goes into the `Authorization` header.
    pub fn jwt_token(&self) -> &str {
        &self.0
    }

    /// Decodes the token payload without verifying its signature.
    ///
    /// Only useful for display and expiry checks; the API verifies the
    /// token itself.
    pub fn claims(&self) -> Result<UserClaims, SessionError> {
        let mut parts = self.0.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(SessionError::Malformed("ID token is not a JWT".to_string())),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| malformed("Base64 decode failed", e))?;
        let raw: RawClaims =
            serde_json::from_slice(&bytes).map_err(|e| malformed("Invalid claims JSON", e))?;

        Ok(raw.into())
    }
}

fn malformed(what: &str, err: impl fmt::Display) -> SessionError {
    SessionError::Malformed(format!("{}: {}", what, err))
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdToken(<redacted>)")
    }
}

/// Claims the catalog backend authorizes on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserClaims {
    pub username: Option<String>,
    pub role: Option<String>,
    pub years_as_member: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawClaims {
    #[serde(rename = "cognito:username")]
    username: Option<String>,
    #[serde(rename = "custom:role")]
    role: Option<String>,
    // Custom attributes arrive as strings, but accept numbers too.
    #[serde(rename = "custom:yearsAsMember")]
    years_as_member: Option<serde_json::Value>,
    exp: Option<i64>,
}

impl From<RawClaims> for UserClaims {
    fn from(raw: RawClaims) -> Self {
        let years_as_member = raw.years_as_member.and_then(|v| match v {
            serde_json::Value::String(s) => s.trim().parse().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        });
        Self {
            username: raw.username,
            role: raw.role,
            years_as_member,
            expires_at: raw.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
        }
    }
}

/// Authenticated identity context.
///
/// `Debug` output never shows any of the tokens.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id_token: IdToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl Session {
    pub fn new(id_token: IdToken) -> Self {
        Self {
            id_token,
            access_token: None,
            refresh_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Expiry of the ID token, when it is a JWT carrying `exp`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.id_token.claims().ok().and_then(|c| c.expires_at)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Session")
            .field("id_token", &self.id_token)
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

/// Provider backed by a fixed, optional session.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
    session: Option<Session>,
}

impl StaticSessionProvider {
    pub fn new(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Provider with nobody signed in.
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn from_id_token(token: impl Into<String>) -> Self {
        Self::new(Session::new(IdToken::new(token)))
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<Session, SessionError> {
        self.session.clone().ok_or(SessionError::NoCurrentUser)
    }
}

/// Provider reading a JSON session file on every call.
///
/// The file looks like `{"idToken": "...", "accessToken": "...",
/// "refreshToken": "..."}`; only `idToken` is required.
#[derive(Debug, Clone)]
pub struct FileSessionProvider {
    path: PathBuf,
}

impl FileSessionProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionProvider for FileSessionProvider {
    async fn current_session(&self) -> Result<Session, SessionError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::NoCurrentUser);
            }
            Err(e) => {
                let message = format!("{}: {}", self.path.display(), e);
                return Err(SessionError::Storage(message));
            }
        };

        let session: Session =
            serde_json::from_str(&raw).map_err(|e| SessionError::Malformed(e.to_string()))?;
        if session.id_token.jwt_token().trim().is_empty() {
            return Err(SessionError::Malformed("idToken is empty".to_string()));
        }

        if let Some(exp) = session.expires_at() {
            if exp <= Utc::now() {
                return Err(SessionError::Expired(exp));
            }
        }

        tracing::debug!("Loaded session from {}", self.path.display());
        Ok(session)
    }
}
