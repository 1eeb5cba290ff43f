//! The caller's authorization credential.

use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};

use super::error::ProxyError;

/// Raw `Authorization` header value, forwarded to the backend untouched.
///
/// Extraction fails with [`ProxyError::MissingCredential`] when the header is
/// absent, empty or only whitespace. The value is never decoded or checked
/// beyond that.
#[derive(Clone)]
pub struct Credential(HeaderValue);

impl Credential {
    pub fn from_header(value: &HeaderValue) -> Option<Self> {
        if value.as_bytes().iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(Self(value.clone()))
    }

    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(Credential::from_header)
            .ok_or(ProxyError::MissingCredential)
    }
}
