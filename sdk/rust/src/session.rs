//! Explicit credential holder.
//!
//! A `Session` is passed to every call that needs authorization, so callers
//! (and tests) decide where the token lives instead of reading a global store.

use std::fmt;

#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A session with no credential.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding `token`. Blank tokens yield an anonymous session.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut session = Self::default();
        session.sign_in(token);
        session
    }

    pub fn sign_in(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.trim().is_empty() { None } else { Some(token) };
    }

    pub fn sign_out(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_from_token() {
        let session = Session::with_token("abc");
        assert_eq!(session.authorization().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn blank_token_is_anonymous() {
        assert!(!Session::with_token("  ").is_authenticated());
        assert_eq!(Session::anonymous().authorization(), None);
    }

    #[test]
    fn sign_out_clears_token() {
        let mut session = Session::with_token("abc");
        session.sign_out();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", Session::with_token("secret"));
        assert!(!rendered.contains("secret"), "{rendered}");
    }
}
