//! Signed cookie sessions.
//!
//! A [`Session`] is the explicit per-request context carrying the role flags
//! and pending flash messages. It travels in a single cookie whose value is
//! `base64url(json) "." hex(hmac_sha256(base64url(json)))`; a cookie that
//! fails verification is treated as an empty session. Logins carry the time
//! they were granted and lapse once older than the store's max age.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::server::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "plantdata_session";

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session cookie is malformed")]
    Malformed,
    #[error("session signature mismatch")]
    BadSignature,
    #[error("session payload invalid: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("session signing key rejected")]
    InvalidKey,
    #[error("session login has expired")]
    Expired,
    #[error("session cookie header invalid: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Danger => "danger",
        }
    }
}

/// A one-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Per-request session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Set after a successful plant operator login
    #[serde(default)]
    pub plant: bool,
    /// Set after a successful administrator login
    #[serde(default)]
    pub admin: bool,
    /// Identity the plant operator logged in with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
    /// Identity the administrator logged in with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    /// Unix seconds of the most recent login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl Session {
    pub fn login_plant(&mut self, plant_name: &str) {
        self.plant = true;
        self.plant_name = Some(plant_name.to_string());
        self.issued_at = Some(chrono::Utc::now().timestamp());
    }

    pub fn login_admin(&mut self, username: &str) {
        self.admin = true;
        self.admin_name = Some(username.to_string());
        self.issued_at = Some(chrono::Utc::now().timestamp());
    }

    /// Drop only the plant role, keeping any admin login.
    pub fn logout_plant(&mut self) {
        self.plant = false;
        self.plant_name = None;
        if !self.admin {
            self.issued_at = None;
        }
    }

    fn has_role(&self) -> bool {
        self.plant || self.admin
    }

    /// Drop every flag and message.
    pub fn clear(&mut self) {
        *self = Session::default();
    }

    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    /// Remove and return pending flash messages.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}

/// Secret key material for signing session cookies.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    pub fn new(secret: &[u8]) -> Self {
        SessionKey(secret.to_vec())
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SessionError> {
        let mut mac = HmacSha256::new_from_slice(&self.0).map_err(|_| SessionError::InvalidKey)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}

/// Encodes, verifies and emits session cookies.
#[derive(Debug, Clone)]
pub struct SessionStore {
    key: Arc<SessionKey>,
    secure: bool,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(secret: &str, secure: bool, max_age: Duration) -> Self {
        Self {
            key: Arc::new(SessionKey::new(secret.as_bytes())),
            secure,
            max_age,
        }
    }

    /// Serialize and sign a session into a cookie value.
    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let json = serde_json::to_vec(session)?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(self.key.sign(payload.as_bytes())?);
        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify and deserialize a cookie value.
    pub fn decode(&self, value: &str) -> Result<Session, SessionError> {
        let (payload, signature_hex) = value.split_once('.').ok_or(SessionError::Malformed)?;
        let provided = hex::decode(signature_hex).map_err(|_| SessionError::Malformed)?;
        let expected = self.key.sign(payload.as_bytes())?;

        if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Err(SessionError::BadSignature);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Malformed)?;
        let session: Session = serde_json::from_slice(&json)?;

        if session.has_role() && !self.is_fresh(session.issued_at) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    /// A login without an issue time, or one from the future, is never fresh.
    fn is_fresh(&self, issued_at: Option<i64>) -> bool {
        let Some(issued_at) = issued_at else {
            return false;
        };
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let age = chrono::Utc::now().timestamp().saturating_sub(issued_at);
        (0..=max_age).contains(&age)
    }

    /// Read the session from request headers; missing or invalid cookies yield an empty session.
    pub fn load(&self, headers: &HeaderMap) -> Session {
        let Some(raw) = find_cookie(headers, SESSION_COOKIE) else {
            return Session::default();
        };

        match self.decode(&raw) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "Discarding invalid session cookie");
                Session::default()
            }
        }
    }

    /// Build the `Set-Cookie` for the given session.
    pub fn persist(&self, session: &Session) -> Result<SessionCookie, SessionError> {
        let value = self.encode(session)?;
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            value,
            self.max_age.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        Ok(SessionCookie(HeaderValue::from_str(&cookie)?))
    }

    /// Build a `Set-Cookie` that expires the session cookie.
    pub fn expire(&self) -> SessionCookie {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            SESSION_COOKIE
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        SessionCookie(HeaderValue::from_str(&cookie).unwrap_or(HeaderValue::from_static("")))
    }
}

/// A `Set-Cookie` header ready to be attached to a response.
#[derive(Debug, Clone)]
pub struct SessionCookie(HeaderValue);

impl SessionCookie {
    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().append(SET_COOKIE, self.0);
        Ok(res)
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.load(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_AGE: Duration = Duration::from_secs(3600);

    fn store() -> SessionStore {
        SessionStore::new("test-session-secret-value", false, MAX_AGE)
    }

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, value)).unwrap(),
        );
        headers
    }

    #[test]
    fn signed_session_survives_a_request() {
        let store = store();
        let mut session = Session::default();
        session.login_admin("admin");
        session.flash(FlashLevel::Success, "Record updated");

        let encoded = store.encode(&session).unwrap();
        let loaded = store.load(&cookie_headers(&encoded));

        assert_eq!(loaded, session);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let store = store();
        let mut session = Session::default();
        session.login_plant("plant1");
        let encoded = store.encode(&session).unwrap();
        let (_, signature) = encoded.split_once('.').unwrap();

        let mut forged = Session::default();
        forged.login_admin("intruder");
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());
        let tampered = format!("{}.{}", forged_payload, signature);

        assert!(matches!(
            store.decode(&tampered),
            Err(SessionError::BadSignature)
        ));
        assert_eq!(store.load(&cookie_headers(&tampered)), Session::default());
    }

    #[test]
    fn cookie_signed_with_other_secret_is_ignored() {
        let other = SessionStore::new("a-completely-different-secret", false, MAX_AGE);
        let mut session = Session::default();
        session.login_admin("admin");
        let encoded = other.encode(&session).unwrap();

        assert!(!store().load(&cookie_headers(&encoded)).admin);
    }

    #[test]
    fn stale_login_is_rejected() {
        let store = store();
        let mut session = Session::default();
        session.login_admin("admin");
        session.issued_at = session.issued_at.map(|at| at - MAX_AGE.as_secs() as i64 - 1);
        let encoded = store.encode(&session).unwrap();

        assert!(matches!(store.decode(&encoded), Err(SessionError::Expired)));
        assert!(!store.load(&cookie_headers(&encoded)).admin);
    }

    #[test]
    fn login_without_issue_time_is_rejected() {
        let store = store();
        let forged = Session {
            plant: true,
            plant_name: Some("plant1".to_string()),
            ..Session::default()
        };
        let encoded = store.encode(&forged).unwrap();

        assert!(matches!(store.decode(&encoded), Err(SessionError::Expired)));
    }

    #[test]
    fn fresh_login_and_anonymous_flashes_are_accepted() {
        let store = store();
        let mut session = Session::default();
        session.login_plant("plant1");
        let encoded = store.encode(&session).unwrap();
        assert!(store.decode(&encoded).unwrap().plant);

        let mut anonymous = Session::default();
        anonymous.flash(FlashLevel::Danger, "Invalid credentials");
        let encoded = store.encode(&anonymous).unwrap();
        assert_eq!(store.decode(&encoded).unwrap(), anonymous);
    }

    #[test]
    fn garbage_cookie_yields_empty_session() {
        let loaded = store().load(&cookie_headers("not-a-session"));
        assert_eq!(loaded, Session::default());
        assert_eq!(store().load(&HeaderMap::new()), Session::default());
    }

    #[test]
    fn plant_logout_keeps_admin_flag() {
        let mut session = Session::default();
        session.login_plant("plant1");
        session.login_admin("admin");
        session.logout_plant();
        assert!(!session.plant);
        assert!(session.plant_name.is_none());
        assert!(session.admin);

        session.clear();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn flashes_are_taken_once() {
        let mut session = Session::default();
        session.flash(FlashLevel::Danger, "Invalid username or password");
        assert_eq!(session.take_flashes().len(), 1);
        assert!(session.take_flashes().is_empty());
    }

    #[test]
    fn persisted_cookie_attributes() {
        let secure = SessionStore::new("test-session-secret-value", true, MAX_AGE);
        let cookie = secure.persist(&Session::default()).unwrap();
        let value = cookie.header_value().to_str().unwrap();
        assert!(value.starts_with("plantdata_session="));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=3600"));
        assert!(value.ends_with("; Secure"));

        let expired = store().expire();
        assert!(expired.header_value().to_str().unwrap().contains("Max-Age=0"));
    }
}
